//! Fixed-frequency sampling for the iterative strategy
//!
//! Frequencies use the short pandas-style offset syntax (`1D`, `12H`,
//! `30min`, `1W`). Each sample point becomes one API window. Weekly
//! frequencies are anchored to Sundays, like pandas' `W` alias (`W-SUN`).

use crate::range::TimeRange;
use crate::{InputError, InputResult};
use chrono::{Datelike, Duration, NaiveTime};
use std::fmt;
use std::str::FromStr;

/// A positive sampling step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    step: Duration,
    label_count: i64,
    label_unit: &'static str,
}

impl Frequency {
    pub fn step(&self) -> Duration {
        self.step
    }

    /// True for steps of one day or more
    pub fn is_daily(&self) -> bool {
        self.step >= Duration::days(1)
    }

    /// True for `W` frequencies, whose points fall on Sundays
    pub fn is_weekly(&self) -> bool {
        self.label_unit == "W"
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self {
            step: Duration::days(1),
            label_count: 1,
            label_unit: "D",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label_count, self.label_unit)
    }
}

impl FromStr for Frequency {
    type Err = InputError;

    fn from_str(value: &str) -> InputResult<Self> {
        let trimmed = value.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);

        let count: i64 = if digits.is_empty() {
            1
        } else {
            digits
                .parse()
                .map_err(|_| InputError::Frequency(value.to_string()))?
        };

        if count < 1 {
            return Err(InputError::Frequency(value.to_string()));
        }

        let (unit_seconds, label_unit) = match unit {
            "W" | "w" => (7 * 86_400, "W"),
            "D" | "d" => (86_400, "D"),
            "H" | "h" => (3_600, "H"),
            "min" | "T" => (60, "min"),
            "S" | "s" => (1, "S"),
            _ => return Err(InputError::Frequency(value.to_string())),
        };

        let seconds = count
            .checked_mul(unit_seconds)
            .ok_or_else(|| InputError::Frequency(value.to_string()))?;
        let step = Duration::try_seconds(seconds)
            .ok_or_else(|| InputError::Frequency(value.to_string()))?;

        Ok(Self {
            step,
            label_count: count,
            label_unit,
        })
    }
}

/// Plans the windows of an iterative crawl
///
/// Sample points run from `range.from()` in steps of `frequency`, up to and
/// including `range.to()`. Weekly points start on the first Sunday on or
/// after `range.from()`, keeping its time of day. Daily (or coarser) points cover their whole
/// calendar day, `00:00:00` to `23:59:59`. Sub-daily points cover one step,
/// ending a second before the next point and never past the end of their
/// day. Frequencies shorter than `min_interval` are rejected.
pub fn plan_buckets(
    range: &TimeRange,
    frequency: Frequency,
    min_interval: Duration,
) -> InputResult<Vec<TimeRange>> {
    if frequency.step() < min_interval {
        return Err(InputError::FrequencyTooShort(
            frequency.to_string(),
            min_interval.num_seconds(),
        ));
    }

    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    let mut buckets = Vec::new();
    let mut point = range.from();
    if frequency.is_weekly() {
        let days_to_sunday = (7 - point.weekday().num_days_from_sunday()) % 7;
        point += Duration::days(i64::from(days_to_sunday));
    }

    while point <= range.to() {
        let day = point.date();
        let day_end = day.and_time(last_second);

        let bucket = if frequency.is_daily() {
            TimeRange::new(day.and_time(NaiveTime::MIN), day_end)?
        } else {
            let unclipped = point + frequency.step() - Duration::seconds(1);
            // A point on the day's last second keeps its full step
            let end = if day_end > point {
                unclipped.min(day_end)
            } else {
                unclipped
            };
            TimeRange::new(point, end)?
        };
        buckets.push(bucket);

        point += frequency.step();
    }

    Ok(buckets)
}
