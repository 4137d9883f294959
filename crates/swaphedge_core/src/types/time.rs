//! Date handling and day-count conventions.
//!
//! Provides a type-safe [`Date`] wrapper around `chrono::NaiveDate` and the
//! [`DayCount`] conventions used to turn date pairs into year fractions.
//! Calendar and business-day adjustment are a collaborator concern; the
//! engine works on already-validated date sequences.
//!
//! # Examples
//!
//! ```
//! use swaphedge_core::types::time::{Date, DayCount};
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 7, 1).unwrap();
//!
//! let yf = DayCount::Act365Fixed.year_fraction(start, end);
//! assert!((yf - 0.4986).abs() < 0.001);
//! ```

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around `chrono::NaiveDate`.
///
/// Serializes transparently as an ISO 8601 string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a `Date` from year, month and day components.
    ///
    /// Returns `Err(DateError::InvalidDate)` for impossible dates such as
    /// February 30th.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses a date from an ISO 8601 string (YYYY-MM-DD).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| DateError::ParseError {
                input: s.to_string(),
            })
    }

    /// Returns the wrapped `chrono::NaiveDate`.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns this date shifted by a whole number of days.
    pub fn add_days(self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }
}

impl Sub for Date {
    type Output = i64;

    /// Number of days between two dates (`self - other`).
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Day-count conventions for year-fraction calculations.
///
/// The engine prices on ACT/365F throughout; ACT/360 is kept for floating
/// legs quoted on a money-market basis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum DayCount {
    /// Actual days / 365.
    #[default]
    Act365Fixed,
    /// Actual days / 360.
    Act360,
}

impl DayCount {
    /// Convention name as quoted on term sheets.
    pub fn name(&self) -> &'static str {
        match self {
            DayCount::Act365Fixed => "ACT/365F",
            DayCount::Act360 => "ACT/360",
        }
    }

    /// Year fraction between two dates under this convention.
    ///
    /// Negative when `end` precedes `start`.
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        let days = (end - start) as f64;
        match self {
            DayCount::Act365Fixed => days / 365.0,
            DayCount::Act360 => days / 360.0,
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
