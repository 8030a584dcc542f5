//! Calendar bucket keys for the aggregate views.
//!
//! Each key is derived from a single [`Instant`] using that instant's own
//! offset, orders chronologically, and renders to its fixed label format
//! through [`Display`](std::fmt::Display). Keys serialise as their labels so
//! they can be used directly as JSON object keys.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::models::Instant;

/// A calendar grouping derived from an instant.
pub trait BucketKey: Ord + Copy + fmt::Display {
    /// The bucket containing `instant`, in the instant's own offset.
    fn of(instant: &Instant) -> Self;
}

macro_rules! serialize_as_label {
    ($($key:ty),*) => {
        $(
            impl Serialize for $key {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

// ── MonthKey ──────────────────────────────────────────────────────────────────

/// Calendar month, label `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl BucketKey for MonthKey {
    fn of(instant: &Instant) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ── WeekKey ───────────────────────────────────────────────────────────────────

/// ISO-8601 week, label `"YYYY Wnn"`.
///
/// `year` is the ISO week-numbering year, which differs from the calendar
/// year for days around New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl BucketKey for WeekKey {
    fn of(instant: &Instant) -> Self {
        let iso = instant.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04} W{:02}", self.year, self.week)
    }
}

// ── DayKey ────────────────────────────────────────────────────────────────────

/// Local calendar date, label `"YYYY-MM-DD Www"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(pub NaiveDate);

impl BucketKey for DayKey {
    fn of(instant: &Instant) -> Self {
        Self(instant.date_naive())
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %a"))
    }
}

// ── WeekdayKey ────────────────────────────────────────────────────────────────

/// Day of the week, label `"n Www"` with Monday = 1 through Sunday = 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayKey(pub Weekday);

impl WeekdayKey {
    pub fn new(weekday: Weekday) -> Self {
        Self(weekday)
    }

    /// 1 (Monday) through 7 (Sunday).
    pub fn ordinal(&self) -> u32 {
        self.0.number_from_monday()
    }
}

impl PartialOrd for WeekdayKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeekdayKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl BucketKey for WeekdayKey {
    fn of(instant: &Instant) -> Self {
        Self::new(instant.weekday())
    }
}

impl fmt::Display for WeekdayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ordinal(), self.0)
    }
}

serialize_as_label!(MonthKey, WeekKey, DayKey, WeekdayKey);
