//! Analysis pipeline for a timestamp log.
//!
//! Parses raw lines, normalises them to quanta, builds sessions and rolls
//! them up into a [`TimeReport`]. Output is all-or-nothing: a fatal parse
//! error yields no partial report.

use std::path::Path;

use chrono::Local;
use serde::Serialize;
use timelog_core::error::Result;
use timelog_core::models::Quantum;
use tracing::info;

use crate::aggregator::{Aggregator, TimeReport};
use crate::analyzer::SessionAnalyzer;
use crate::reader::{parse_lines, read_lines, ParsePolicy};

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for one analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    pub quantum: Quantum,
    pub policy: ParsePolicy,
}

/// Metadata produced alongside the report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    pub quantum_minutes: i64,
    pub lines_read: usize,
    pub blank_lines: usize,
    pub skipped_lines: usize,
    pub timestamps_parsed: usize,
    /// Distinct quanta after normalisation.
    pub markers: usize,
    pub sessions: usize,
    pub total_hours: f64,
    /// Wall-clock seconds spent parsing lines.
    pub parse_time_seconds: f64,
    /// Wall-clock seconds spent building sessions and views.
    pub aggregate_time_seconds: f64,
}

/// The complete output of [`analyze_lines`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub report: TimeReport,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline over the log file at `path`.
pub fn analyze_file(path: &Path, options: AnalysisOptions) -> Result<AnalysisResult> {
    let lines = read_lines(path)?;
    analyze_lines(lines, options)
}

/// Run the full pipeline over already-read lines.
///
/// 1. Parse every non-blank line according to `options.policy`.
/// 2. Truncate to quanta, sort and de-duplicate.
/// 3. Group adjacent markers into sessions.
/// 4. Aggregate into month, week, day and weekday views.
pub fn analyze_lines<I, S>(lines: I, options: AnalysisOptions) -> Result<AnalysisResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // ── Step 1: Parse ─────────────────────────────────────────────────────────
    let parse_start = std::time::Instant::now();
    let parsed = parse_lines(lines, options.policy)?;
    let parse_time = parse_start.elapsed().as_secs_f64();

    // ── Steps 2-4: Sessions and views ─────────────────────────────────────────
    let aggregate_start = std::time::Instant::now();
    let analyzer = SessionAnalyzer::new(options.quantum);
    let markers = analyzer.normalize(parsed.instants.iter().copied());
    let sessions = analyzer.build_sessions(&markers);
    let report = Aggregator::aggregate(&sessions);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Local::now().to_rfc3339(),
        quantum_minutes: options.quantum.minutes(),
        lines_read: parsed.lines_read,
        blank_lines: parsed.blank_lines,
        skipped_lines: parsed.skipped.len(),
        timestamps_parsed: parsed.instants.len(),
        markers: markers.len(),
        sessions: sessions.len(),
        total_hours: Aggregator::calculate_total(&sessions),
        parse_time_seconds: parse_time,
        aggregate_time_seconds: aggregate_time,
    };

    info!(
        timestamps = metadata.timestamps_parsed,
        sessions = metadata.sessions,
        total_hours = metadata.total_hours,
        "analysis complete"
    );

    Ok(AnalysisResult { report, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
