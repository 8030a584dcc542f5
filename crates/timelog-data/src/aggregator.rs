//! Time-spent aggregation over calendar buckets.
//!
//! Every session is attributed whole to the buckets containing its start
//! instant (in the start's own offset). A session running past midnight is
//! not split.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use timelog_core::buckets::{BucketKey, DayKey, MonthKey, WeekKey, WeekdayKey};
use timelog_core::models::{hours, Session};

// ── WeekdayStats ──────────────────────────────────────────────────────────────

/// Hours recorded on one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekdayStats {
    /// Total hours over all matching dates.
    pub sum: f64,
    /// `sum` divided by the number of distinct dates that had a session.
    pub avg: f64,
    /// Number of distinct dates contributing.
    #[serde(skip)]
    pub days: usize,
}

// ── TimeReport ────────────────────────────────────────────────────────────────

/// The four aggregate views plus the longest session.
///
/// Views only hold buckets that received at least one session, and iterate
/// in chronological key order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeReport {
    pub months: BTreeMap<MonthKey, f64>,
    pub weeks: BTreeMap<WeekKey, f64>,
    pub days: BTreeMap<DayKey, f64>,
    pub weekdays: BTreeMap<WeekdayKey, WeekdayStats>,
    /// `None` when no sessions were recorded.
    pub longest_session: Option<Session>,
}

impl TimeReport {
    /// Whether no time at all was recorded.
    pub fn is_empty(&self) -> bool {
        self.longest_session.is_none()
    }

    /// Total hours, taken from the month view.
    pub fn total_hours(&self) -> f64 {
        self.months.values().sum()
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Stateless helper that rolls sessions up into calendar buckets.
pub struct Aggregator;

impl Aggregator {
    /// Build every view from `sessions`.
    pub fn aggregate(sessions: &[Session]) -> TimeReport {
        TimeReport {
            months: Self::aggregate_monthly(sessions),
            weeks: Self::aggregate_weekly(sessions),
            days: Self::aggregate_daily(sessions),
            weekdays: Self::aggregate_weekdays(sessions),
            longest_session: Self::longest_session(sessions),
        }
    }

    /// Hours per `"YYYY-MM"`.
    pub fn aggregate_monthly(sessions: &[Session]) -> BTreeMap<MonthKey, f64> {
        Self::sum_by_bucket(sessions)
    }

    /// Hours per ISO week `"YYYY Wnn"`.
    pub fn aggregate_weekly(sessions: &[Session]) -> BTreeMap<WeekKey, f64> {
        Self::sum_by_bucket(sessions)
    }

    /// Hours per `"YYYY-MM-DD Www"`.
    pub fn aggregate_daily(sessions: &[Session]) -> BTreeMap<DayKey, f64> {
        Self::sum_by_bucket(sessions)
    }

    /// Sum and per-date average of hours per day of the week.
    pub fn aggregate_weekdays(sessions: &[Session]) -> BTreeMap<WeekdayKey, WeekdayStats> {
        let grouped = sessions.iter().fold(
            BTreeMap::<WeekdayKey, (TimeDelta, BTreeSet<NaiveDate>)>::new(),
            |mut acc, session| {
                let start = session.start();
                let (total, dates) = acc
                    .entry(WeekdayKey::of(&start))
                    .or_insert_with(|| (TimeDelta::zero(), BTreeSet::new()));
                *total += session.duration();
                dates.insert(start.date_naive());
                acc
            },
        );

        grouped
            .into_iter()
            .map(|(key, (total, dates))| {
                let sum = hours(total);
                let days = dates.len();
                let stats = WeekdayStats {
                    sum,
                    avg: sum / days as f64,
                    days,
                };
                (key, stats)
            })
            .collect()
    }

    /// The longest session; ties go to the earliest start.
    pub fn longest_session(sessions: &[Session]) -> Option<Session> {
        sessions.iter().copied().max_by(|a, b| {
            a.duration()
                .cmp(&b.duration())
                .then_with(|| b.start().cmp(&a.start()))
        })
    }

    /// Total hours over all sessions.
    pub fn calculate_total(sessions: &[Session]) -> f64 {
        hours(sessions.iter().map(Session::duration).sum())
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Fold session durations into the bucket of each session's start.
    fn sum_by_bucket<K: BucketKey>(sessions: &[Session]) -> BTreeMap<K, f64> {
        sessions
            .iter()
            .fold(BTreeMap::<K, TimeDelta>::new(), |mut acc, session| {
                *acc.entry(K::of(&session.start()))
                    .or_insert_with(TimeDelta::zero) += session.duration();
                acc
            })
            .into_iter()
            .map(|(key, total)| (key, hours(total)))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
