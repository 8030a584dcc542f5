//! Plain-text report: one aligned table per view.
//!
//! Sections appear as Months, Weeks, Days, Days of Week and Longest Session.
//! Bucket labels are left-aligned, figures right-aligned, and column widths
//! are measured in terminal cells.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use timelog_core::formatting::{format_duration, format_hours, format_number};
use timelog_core::models::Session;
use timelog_data::aggregator::TimeReport;
use timelog_data::analysis::AnalysisResult;
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

// ── ReportLimits ──────────────────────────────────────────────────────────────

/// How many of the most recent week and day buckets to show.
///
/// `None` shows everything. Months and weekdays are never limited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportLimits {
    pub weeks: Option<usize>,
    pub days: Option<usize>,
}

impl ReportLimits {
    /// A copy of `report` with the week and day views cut to the limits.
    pub fn apply(&self, report: &TimeReport) -> TimeReport {
        TimeReport {
            weeks: keep_recent(report.weeks.clone(), self.weeks),
            days: keep_recent(report.days.clone(), self.days),
            ..report.clone()
        }
    }
}

/// Keep the `n` greatest keys of `map`.
fn keep_recent<K: Ord + Clone, V>(mut map: BTreeMap<K, V>, n: Option<usize>) -> BTreeMap<K, V> {
    let Some(n) = n else {
        return map;
    };
    if map.len() <= n {
        return map;
    }
    match map.keys().nth(map.len() - n).cloned() {
        Some(cut) => map.split_off(&cut),
        None => BTreeMap::new(),
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

/// One line of a section table.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<String>,
}

impl TableRow {
    fn new(label: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            label: label.into(),
            cells,
        }
    }
}

fn hour_rows<K: ToString>(view: &BTreeMap<K, f64>) -> Vec<TableRow> {
    view.iter()
        .map(|(key, hours)| TableRow::new(key.to_string(), vec![format_hours(*hours)]))
        .collect()
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render the whole text report.
pub fn render_report(result: &AnalysisResult, limits: ReportLimits, theme: &Theme) -> String {
    let report = limits.apply(&result.report);
    let mut out = String::new();

    let months = hour_rows(&report.months);
    let total = TableRow::new(
        "Total",
        vec![
            format_hours(result.metadata.total_hours),
            format!("{} sessions", result.metadata.sessions),
        ],
    );
    render_section(&mut out, "Months", None, &months, Some(&total), theme);

    render_section(&mut out, "Weeks", None, &hour_rows(&report.weeks), None, theme);
    render_section(&mut out, "Days", None, &hour_rows(&report.days), None, theme);

    let weekdays: Vec<TableRow> = report
        .weekdays
        .iter()
        .map(|(key, stats)| {
            TableRow::new(
                key.to_string(),
                vec![format_hours(stats.sum), format_number(stats.avg, 2)],
            )
        })
        .collect();
    render_section(
        &mut out,
        "Days of Week",
        Some(&["sum", "avg"][..]),
        &weekdays,
        None,
        theme,
    );

    render_heading(&mut out, "Longest Session", theme);
    match &report.longest_session {
        Some(session) => {
            let _ = writeln!(out, "{}", Theme::paint(theme.highlight, &describe_session(session)));
        }
        None => {
            let _ = writeln!(out, "{}", Theme::paint(theme.warning, "no sessions recorded"));
        }
    }

    out
}

/// `[start] to [end] (H:MM:SS)`, both ends in the session's own offset.
pub fn describe_session(session: &Session) -> String {
    format!(
        "[{}] to [{}] ({})",
        session.start().format(STAMP_FORMAT),
        session.end().format(STAMP_FORMAT),
        format_duration(session.duration())
    )
}

fn render_heading(out: &mut String, title: &str, theme: &Theme) {
    let rule = "─".repeat(title.width());
    let _ = writeln!(out, "{}", Theme::paint(theme.heading, title));
    let _ = writeln!(out, "{}", Theme::paint(theme.rule, &rule));
}

/// Render a titled table with an optional header row and totals row.
fn render_section(
    out: &mut String,
    title: &str,
    header: Option<&[&str]>,
    rows: &[TableRow],
    totals: Option<&TableRow>,
    theme: &Theme,
) {
    render_heading(out, title, theme);

    if rows.is_empty() {
        let _ = writeln!(out, "{}", Theme::paint(theme.dim, "(none)"));
        let _ = writeln!(out);
        return;
    }

    let columns = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let all_rows = rows.iter().chain(totals);

    let label_width = all_rows
        .clone()
        .map(|r| r.label.width())
        .max()
        .unwrap_or(0);
    let mut widths: Vec<usize> = (0..columns)
        .map(|i| header.and_then(|h| h.get(i)).map_or(0, |h| h.width()))
        .collect();
    for row in all_rows {
        for (i, cell) in row.cells.iter().take(columns).enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    if let Some(header) = header {
        let cells: Vec<String> = header.iter().map(|h| h.to_string()).collect();
        let line = format_line("", &cells, label_width, &widths);
        let _ = writeln!(out, "{}", Theme::paint(theme.dim, &line));
    }

    for row in rows {
        let label = pad_right(&row.label, label_width);
        let figures = format_cells(&row.cells, &widths);
        let _ = writeln!(
            out,
            "{}  {}",
            Theme::paint(theme.label, &label),
            Theme::paint(theme.value, &figures)
        );
    }

    if let Some(totals) = totals {
        let (first, rest) = totals.cells.split_at(totals.cells.len().min(columns));
        let mut line = format_line(&totals.label, first, label_width, &widths);
        for extra in rest {
            line.push_str("  ");
            line.push_str(extra);
        }
        let _ = writeln!(out, "{}", Theme::paint(theme.total, &line));
    }

    let _ = writeln!(out);
}

fn format_line(label: &str, cells: &[String], label_width: usize, widths: &[usize]) -> String {
    format!("{}  {}", pad_right(label, label_width), format_cells(cells, widths))
}

fn format_cells(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad_left(cell, *width))
        .collect::<Vec<_>>()
        .join("  ")
}

fn pad_right(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

fn pad_left(s: &str, width: usize) -> String {
    format!("{}{}", " ".repeat(width.saturating_sub(s.width())), s)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
