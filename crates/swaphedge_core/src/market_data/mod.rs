//! Market data: yield curves.

pub mod curves;
