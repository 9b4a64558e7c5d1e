//! Time windows for API calls
//!
//! This module provides the `TimeRange` type that every API call is issued
//! for, timestamp parsing for command-line input, and fixed-frequency bucket
//! planning for the iterative strategy.

mod frequency;

pub use frequency::{plan_buckets, Frequency};

use crate::article::DATE_FORMAT;
use crate::{InputError, InputResult};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;

/// Timestamp format of the `startdatetime`/`enddatetime` query parameters
pub const GDELT_FORMAT: &str = "%Y%m%d%H%M%S";

/// Date-only format, used for input and output file names
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A half-open search window `[from, to)` with `from < to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    from: NaiveDateTime,
    to: NaiveDateTime,
}

impl TimeRange {
    /// Creates a range, rejecting empty or inverted windows
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> InputResult<Self> {
        if from >= to {
            return Err(InputError::Range {
                from: from.format(DATE_FORMAT).to_string(),
                to: to.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// Returns the exact temporal midpoint
    pub fn midpoint(&self) -> NaiveDateTime {
        self.from + self.duration() / 2
    }

    /// Splits the range at its midpoint into two fresh children
    ///
    /// Returns `None` when the range is too short to produce two non-empty
    /// halves (sub-nanosecond spans).
    pub fn bisect(&self) -> Option<(TimeRange, TimeRange)> {
        let mid = self.midpoint();
        let left = TimeRange::new(self.from, mid).ok()?;
        let right = TimeRange::new(mid, self.to).ok()?;
        Some((left, right))
    }

    /// `startdatetime` query parameter value
    pub fn gdelt_start(&self) -> String {
        self.from.format(GDELT_FORMAT).to_string()
    }

    /// `enddatetime` query parameter value
    pub fn gdelt_end(&self) -> String {
        self.to.format(GDELT_FORMAT).to_string()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} - {}]",
            self.from.format(DATE_FORMAT),
            self.to.format(DATE_FORMAT)
        )
    }
}

/// Parses a command-line timestamp
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`.
/// Dates map to midnight.
pub fn parse_timestamp(value: &str) -> InputResult<NaiveDateTime> {
    let value = value.trim();

    if value.contains(' ') {
        return NaiveDateTime::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| InputError::Timestamp(value.to_string()));
    }

    if value.contains('T') {
        return NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
            .map_err(|_| InputError::Timestamp(value.to_string()));
    }

    NaiveDate::parse_from_str(value, FILE_DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| InputError::Timestamp(value.to_string()))
}
