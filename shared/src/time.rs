//! Instants and spans for dated timeline events.
//!
//! Times are integer milliseconds since the Unix epoch so that clamping and
//! span comparisons never suffer from floating point drift. Conversion to
//! `f64` only happens at the pixel boundary.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MS_PER_DAY: i64 = 86_400_000;

/// Default minimum visible span (30 days).
pub const DEFAULT_MIN_SPAN_DAYS: i64 = 30;

/// A point in time as milliseconds since 1970-01-01T00:00:00Z.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub const ZERO: TimeMs = TimeMs(0);

    pub fn from_millis(millis: i64) -> Self {
        TimeMs(millis)
    }

    /// Midnight UTC of the given calendar day.
    pub fn from_date(date: NaiveDate) -> Self {
        TimeMs(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_date)
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn to_date(self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.0).map(|datetime| datetime.date_naive())
    }

    /// Signed distance from `earlier` to `self`.
    pub fn duration_since(self, earlier: TimeMs) -> DurationMs {
        DurationMs(self.0.saturating_sub(earlier.0))
    }

    pub fn add_duration(self, duration: DurationMs) -> TimeMs {
        TimeMs(self.0.saturating_add(duration.0))
    }

    pub fn sub_duration(self, duration: DurationMs) -> TimeMs {
        TimeMs(self.0.saturating_sub(duration.0))
    }

    /// Halfway point between two instants, rounded towards `a`.
    pub fn midpoint(a: TimeMs, b: TimeMs) -> TimeMs {
        let half = b.duration_since(a).0 / 2;
        a.add_duration(DurationMs(half))
    }
}

impl fmt::Display for TimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp_millis(self.0) {
            Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

/// A signed span in milliseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DurationMs(pub i64);

impl DurationMs {
    pub const ZERO: DurationMs = DurationMs(0);

    pub fn from_millis(millis: i64) -> Self {
        DurationMs(millis)
    }

    pub fn from_days(days: i64) -> Self {
        DurationMs(days.saturating_mul(MS_PER_DAY))
    }

    /// Fractional days; rounds to the nearest millisecond.
    pub fn from_days_f64(days: f64) -> Self {
        DurationMs((days * MS_PER_DAY as f64).round() as i64)
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn days(self) -> f64 {
        self.0 as f64 / MS_PER_DAY as f64
    }

    pub fn abs(self) -> Self {
        DurationMs(self.0.saturating_abs())
    }

    /// Scale a span by a positive factor, rounding to whole milliseconds.
    pub fn scale(self, factor: f64) -> Self {
        DurationMs((self.0 as f64 * factor).round() as i64)
    }
}

impl fmt::Display for DurationMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.days();
        if days.abs() >= 1.0 {
            write!(f, "{:.1}d", days)
        } else {
            write!(f, "{}ms", self.0)
        }
    }
}
