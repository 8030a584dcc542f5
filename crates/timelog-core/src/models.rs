use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::{Result, TimelogError};
use crate::formatting::format_duration;

/// A point in time that keeps the UTC offset it was recorded with.
///
/// Ordering and equality compare absolute time; calendar fields
/// (`year()`, `hour()`, `date_naive()`, ...) read the instant's own offset.
pub type Instant = DateTime<FixedOffset>;

/// Minutes in one day; every quantum must divide it evenly.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Default sampling interval in minutes.
pub const DEFAULT_QUANTUM_MINUTES: i64 = 15;

// ── Quantum ───────────────────────────────────────────────────────────────────

/// The fixed sampling interval raw timestamps are truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantum(TimeDelta);

impl Quantum {
    /// Build a quantum from a length in minutes.
    ///
    /// The length must be positive and divide a day evenly, so that quanta
    /// always start at the same clock times on every local day.
    pub fn from_minutes(minutes: i64) -> Result<Self> {
        if minutes <= 0 {
            return Err(TimelogError::Config(format!(
                "quantum must be a positive number of minutes, got {}",
                minutes
            )));
        }
        if minutes > MINUTES_PER_DAY || MINUTES_PER_DAY % minutes != 0 {
            return Err(TimelogError::Config(format!(
                "quantum of {} minutes does not divide a day evenly",
                minutes
            )));
        }
        Ok(Self(TimeDelta::minutes(minutes)))
    }

    /// Length as a [`TimeDelta`].
    pub fn delta(&self) -> TimeDelta {
        self.0
    }

    /// Length in whole seconds.
    pub fn seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    /// Length in minutes.
    pub fn minutes(&self) -> i64 {
        self.0.num_minutes()
    }

    /// Round `instant` down to the start of its quantum.
    ///
    /// The quantum grid is anchored at local midnight of the instant's own
    /// offset, so the result always shares the input's offset and local date.
    pub fn truncate(&self, instant: Instant) -> Instant {
        let since_midnight = i64::from(instant.num_seconds_from_midnight());
        let excess = TimeDelta::seconds(since_midnight % self.seconds())
            + TimeDelta::nanoseconds(i64::from(instant.nanosecond()));
        instant - excess
    }
}

impl Default for Quantum {
    fn default() -> Self {
        Self(TimeDelta::minutes(DEFAULT_QUANTUM_MINUTES))
    }
}

impl fmt::Display for Quantum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.minutes())
    }
}

// ── IntervalMarker ────────────────────────────────────────────────────────────

/// "One quantum of work was recorded starting here."
///
/// Markers order by absolute time first and by UTC offset second, so that a
/// sort is fully deterministic even when two offsets name the same moment.
#[derive(Debug, Clone, Copy)]
pub struct IntervalMarker {
    start: Instant,
}

impl IntervalMarker {
    /// Marker for the quantum containing `instant`.
    pub fn containing(instant: Instant, quantum: Quantum) -> Self {
        Self {
            start: quantum.truncate(instant),
        }
    }

    /// Start of the marked quantum.
    pub fn start(&self) -> Instant {
        self.start
    }

    fn offset_seconds(&self) -> i32 {
        self.start.offset().local_minus_utc()
    }
}

impl PartialEq for IntervalMarker {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IntervalMarker {}

impl PartialOrd for IntervalMarker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntervalMarker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.offset_seconds().cmp(&other.offset_seconds()))
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// A maximal run of adjacent quanta.
///
/// `end` is exclusive: work continued through the end of the last quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    start: Instant,
    end: Instant,
    quanta: u32,
}

impl Session {
    /// A session made of a single quantum starting at `marker`.
    pub fn open(marker: &IntervalMarker, quantum: Quantum) -> Self {
        Self {
            start: marker.start(),
            end: marker.start() + quantum.delta(),
            quanta: 1,
        }
    }

    /// Whether `marker` starts exactly where this session ends.
    pub fn is_continued_by(&self, marker: &IntervalMarker) -> bool {
        marker.start() == self.end
    }

    /// Extend the session by one quantum.
    pub fn extend(&mut self, quantum: Quantum) {
        self.end += quantum.delta();
        self.quanta += 1;
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    /// Exclusive end, expressed in the start's offset.
    pub fn end(&self) -> Instant {
        self.end
    }

    /// Number of quanta the session covers.
    pub fn quanta(&self) -> u32 {
        self.quanta
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Duration in fractional hours.
    pub fn hours(&self) -> f64 {
        hours(self.duration())
    }
}

impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Session", 5)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.serialize_field("duration", &format_duration(self.duration()))?;
        state.serialize_field("hours", &self.hours())?;
        state.serialize_field("quanta", &self.quanta)?;
        state.end()
    }
}

/// Convert a duration to fractional hours.
pub fn hours(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Instant {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    // ── Quantum ───────────────────────────────────────────────────────────────

    #[test]
    fn test_quantum_default_is_fifteen_minutes() {
        assert_eq!(Quantum::default().minutes(), 15);
        assert_eq!(Quantum::default().to_string(), "15m");
    }

    #[test]
    fn test_quantum_rejects_zero_and_negative() {
        assert!(matches!(
            Quantum::from_minutes(0),
            Err(TimelogError::Config(_))
        ));
        assert!(matches!(
            Quantum::from_minutes(-15),
            Err(TimelogError::Config(_))
        ));
    }

    #[test]
    fn test_quantum_rejects_non_divisor_of_day() {
        assert!(Quantum::from_minutes(7).is_err());
        assert!(Quantum::from_minutes(2880).is_err());
        assert!(Quantum::from_minutes(30).is_ok());
        assert!(Quantum::from_minutes(1440).is_ok());
    }

    #[test]
    fn test_truncate_rounds_down_to_quarter_hour() {
        let q = Quantum::default();
        let truncated = q.truncate(at("2016-02-17T10:44:59.750+01:00"));
        assert_eq!(truncated, at("2016-02-17T10:30:00+01:00"));
        assert_eq!(truncated.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_truncate_keeps_boundary_values() {
        let q = Quantum::default();
        let on_boundary = at("2016-02-17T10:45:00+01:00");
        assert_eq!(q.truncate(on_boundary), on_boundary);
    }

    #[test]
    fn test_truncate_uses_local_midnight_for_odd_offsets() {
        // +05:30 local time 10:40 → 10:30 local, not a UTC quarter boundary
        let q = Quantum::default();
        let truncated = q.truncate(at("2016-02-17T10:40:00+05:30"));
        assert_eq!(truncated, at("2016-02-17T10:30:00+05:30"));
    }

    #[test]
    fn test_truncate_with_daily_quantum_goes_to_local_midnight() {
        let q = Quantum::from_minutes(1440).unwrap();
        let truncated = q.truncate(at("2016-02-17T00:30:00-08:00"));
        assert_eq!(truncated, at("2016-02-17T00:00:00-08:00"));
    }

    // ── IntervalMarker ────────────────────────────────────────────────────────

    #[test]
    fn test_marker_order_breaks_ties_by_offset() {
        let q = Quantum::default();
        let utc = IntervalMarker::containing(at("2016-02-17T09:30:00+00:00"), q);
        let cet = IntervalMarker::containing(at("2016-02-17T10:30:00+01:00"), q);
        assert_eq!(utc.start(), cet.start());
        assert!(utc < cet);
        assert_ne!(utc, cet);
    }

    // ── Session ───────────────────────────────────────────────────────────────

    #[test]
    fn test_session_open_and_extend() {
        let q = Quantum::default();
        let first = IntervalMarker::containing(at("2016-02-17T10:30:00+01:00"), q);
        let second = IntervalMarker::containing(at("2016-02-17T10:45:00+01:00"), q);

        let mut session = Session::open(&first, q);
        assert_eq!(session.duration(), TimeDelta::minutes(15));
        assert!(session.is_continued_by(&second));

        session.extend(q);
        assert_eq!(session.quanta(), 2);
        assert_eq!(session.end(), at("2016-02-17T11:00:00+01:00"));
        assert!((session.hours() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_serializes_times_with_offset() {
        let q = Quantum::default();
        let marker = IntervalMarker::containing(at("2016-02-17T10:30:00+01:00"), q);
        let json = serde_json::to_value(Session::open(&marker, q)).unwrap();
        assert_eq!(json["start"], "2016-02-17T10:30:00+01:00");
        assert_eq!(json["end"], "2016-02-17T10:45:00+01:00");
        assert_eq!(json["duration"], "0:15:00");
        assert_eq!(json["hours"], 0.25);
        assert_eq!(json["quanta"], 1);
    }
}
