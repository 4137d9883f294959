//! Core types: dates, day counts and errors.

pub mod error;
pub mod time;
