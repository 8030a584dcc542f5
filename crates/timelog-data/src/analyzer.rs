//! Quantum normalisation and session building.
//!
//! Turns raw instants into a sorted, de-duplicated sequence of
//! [`IntervalMarker`]s and groups adjacent markers into [`Session`]s.

use timelog_core::models::{Instant, IntervalMarker, Quantum, Session};
use tracing::debug;

// ── SessionAnalyzer ───────────────────────────────────────────────────────────

/// Normalises timestamps to quanta and groups them into sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionAnalyzer {
    quantum: Quantum,
}

impl SessionAnalyzer {
    pub fn new(quantum: Quantum) -> Self {
        Self { quantum }
    }

    /// Truncate every instant to the start of its quantum, then sort and
    /// de-duplicate.
    ///
    /// Input order is irrelevant. Markers naming the same absolute moment
    /// collapse to one, keeping the one with the smallest UTC offset.
    ///
    /// Such a pair is therefore not kept as two distinct local calendar
    /// moments: the surviving marker's offset alone decides its day, week and
    /// month, so `00:30+01:00` logged next to `23:30+00:00` counts for the
    /// earlier date.
    pub fn normalize<I>(&self, instants: I) -> Vec<IntervalMarker>
    where
        I: IntoIterator<Item = Instant>,
    {
        let mut markers: Vec<IntervalMarker> = instants
            .into_iter()
            .map(|instant| IntervalMarker::containing(instant, self.quantum))
            .collect();

        markers.sort_unstable();
        markers.dedup_by(|later, earlier| later.start() == earlier.start());
        markers
    }

    /// Group sorted markers into maximal runs of adjacent quanta.
    ///
    /// A single pass: the current session is extended while the next marker
    /// starts exactly where it ends, otherwise it is closed and a new one
    /// opened. `markers` must come from [`SessionAnalyzer::normalize`].
    pub fn build_sessions(&self, markers: &[IntervalMarker]) -> Vec<Session> {
        let mut sessions: Vec<Session> = Vec::new();
        let mut current: Option<Session> = None;

        for marker in markers {
            match current.as_mut() {
                Some(session) if session.is_continued_by(marker) => {
                    session.extend(self.quantum);
                }
                _ => {
                    if let Some(done) = current.take() {
                        sessions.push(done);
                    }
                    current = Some(Session::open(marker, self.quantum));
                }
            }
        }

        if let Some(done) = current {
            sessions.push(done);
        }

        debug!(
            "SessionAnalyzer: built {} sessions from {} markers",
            sessions.len(),
            markers.len()
        );
        sessions
    }

    /// [`normalize`](Self::normalize) followed by
    /// [`build_sessions`](Self::build_sessions).
    pub fn sessions_from<I>(&self, instants: I) -> Vec<Session>
    where
        I: IntoIterator<Item = Instant>,
    {
        self.build_sessions(&self.normalize(instants))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta};

    fn at(s: &str) -> Instant {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn analyzer() -> SessionAnalyzer {
        SessionAnalyzer::new(Quantum::default())
    }

    fn starts(markers: &[IntervalMarker]) -> Vec<Instant> {
        markers.iter().map(|m| m.start()).collect()
    }

    // ── normalize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_sorts_and_deduplicates() {
        let markers = analyzer().normalize([
            at("2016-02-17T10:52:00+01:00"),
            at("2016-02-17T10:31:00+01:00"),
            at("2016-02-17T10:44:59+01:00"),
            at("2016-02-17T10:46:00+01:00"),
        ]);

        assert_eq!(
            starts(&markers),
            vec![at("2016-02-17T10:30:00+01:00"), at("2016-02-17T10:45:00+01:00")]
        );
    }

    #[test]
    fn test_normalize_is_order_independent() {
        let a = analyzer().normalize([
            at("2016-02-17T10:31:00+01:00"),
            at("2016-02-18T09:02:00+01:00"),
            at("2016-02-17T12:15:00+01:00"),
        ]);
        let b = analyzer().normalize([
            at("2016-02-17T12:15:00+01:00"),
            at("2016-02-17T10:31:00+01:00"),
            at("2016-02-18T09:02:00+01:00"),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = analyzer().normalize([
            at("2016-02-17T10:31:00+01:00"),
            at("2016-02-17T10:33:00+01:00"),
            at("2016-02-17T23:59:59+01:00"),
        ]);
        let twice = analyzer().normalize(starts(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_truncation_is_monotonic() {
        let q = Quantum::default();
        let samples: Vec<Instant> = (0..200)
            .map(|i| at("2016-02-17T00:00:00+01:00") + TimeDelta::seconds(i * 431))
            .collect();

        for pair in samples.windows(2) {
            assert!(q.truncate(pair[0]) <= q.truncate(pair[1]));
        }
    }

    #[test]
    fn test_normalize_same_moment_different_offsets_collapses() {
        let markers = analyzer().normalize([
            at("2016-02-17T10:30:00+01:00"),
            at("2016-02-17T09:30:00+00:00"),
        ]);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].start().offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_normalize_collapsed_moment_keeps_smallest_offset_date() {
        let markers = analyzer().normalize([
            at("2016-02-17T00:30:00+01:00"),
            at("2016-02-16T23:30:00+00:00"),
        ]);
        assert_eq!(markers.len(), 1);
        assert_eq!(
            markers[0].start().date_naive(),
            chrono::NaiveDate::from_ymd_opt(2016, 2, 16).unwrap()
        );
    }

    #[test]
    fn test_normalize_truncates_in_local_offset() {
        // 10:40 at +05:30 is 05:10 UTC; the local grid gives 10:30 local.
        let markers = analyzer().normalize([at("2016-02-17T10:40:00+05:30")]);
        assert_eq!(markers[0].start(), at("2016-02-17T10:30:00+05:30"));
    }

    // ── build_sessions ────────────────────────────────────────────────────────

    #[test]
    fn test_build_sessions_empty() {
        assert!(analyzer().build_sessions(&[]).is_empty());
    }

    #[test]
    fn test_build_sessions_single_marker() {
        let sessions = analyzer().sessions_from([at("2016-02-17T10:31:00+01:00")]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].start(), at("2016-02-17T10:30:00+01:00"));
        assert_eq!(sessions[0].end(), at("2016-02-17T10:45:00+01:00"));
        assert_eq!(sessions[0].duration(), TimeDelta::minutes(15));
    }

    #[test]
    fn test_build_sessions_splits_on_gap() {
        let sessions = analyzer().sessions_from([
            at("2016-02-17T10:00:00+01:00"),
            at("2016-02-17T10:15:00+01:00"),
            // 10:30 missing
            at("2016-02-17T10:45:00+01:00"),
        ]);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].duration(), TimeDelta::minutes(30));
        assert_eq!(sessions[1].start(), at("2016-02-17T10:45:00+01:00"));
        assert_eq!(sessions[1].duration(), TimeDelta::minutes(15));
    }

    #[test]
    fn test_build_sessions_joins_across_midnight() {
        let sessions = analyzer().sessions_from([
            at("2016-02-17T23:50:00+01:00"),
            at("2016-02-18T00:05:00+01:00"),
        ]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].quanta(), 2);
    }

    #[test]
    fn test_build_sessions_joins_across_offset_change() {
        // 01:45 +01:00 and 03:00 +02:00 are one quantum apart in absolute time
        let sessions = analyzer().sessions_from([
            at("2016-03-27T01:45:00+01:00"),
            at("2016-03-27T03:00:00+02:00"),
        ]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration(), TimeDelta::minutes(30));
    }

    #[test]
    fn test_sessions_cover_every_marker_exactly_once() {
        let q = Quantum::default();
        let instants: Vec<Instant> = [
            0, 3, 17, 29, 31, 60, 61, 75, 200, 214, 215, 230, 500, 1000, 1014,
        ]
        .iter()
        .map(|m| at("2016-02-17T08:00:00+01:00") + TimeDelta::minutes(*m))
        .collect();

        let markers = analyzer().normalize(instants);
        let sessions = analyzer().build_sessions(&markers);

        let covered: Vec<Instant> = sessions
            .iter()
            .flat_map(|s| (0..s.quanta()).map(move |i| s.start() + q.delta() * i as i32))
            .collect();
        assert_eq!(covered, starts(&markers));

        // Maximality: consecutive sessions never touch.
        for pair in sessions.windows(2) {
            assert!(pair[0].end() < pair[1].start());
        }
        for s in &sessions {
            assert_eq!(s.duration(), q.delta() * s.quanta() as i32);
        }
    }

    #[test]
    fn test_non_default_quantum() {
        let analyzer = SessionAnalyzer::new(Quantum::from_minutes(60).unwrap());
        let sessions = analyzer.sessions_from([
            at("2016-02-17T10:59:00+01:00"),
            at("2016-02-17T11:01:00+01:00"),
        ]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration(), TimeDelta::hours(2));
    }
}
