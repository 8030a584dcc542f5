//! Machine-readable report.

use serde::Serialize;
use timelog_core::error::Result;
use timelog_data::aggregator::TimeReport;
use timelog_data::analysis::{AnalysisMetadata, AnalysisResult};

use crate::table_view::ReportLimits;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: TimeReport,
    metadata: &'a AnalysisMetadata,
}

/// Pretty-printed JSON with `months`, `weeks`, `days`, `weekdays`,
/// `longest_session` (or `null`) and `metadata`.
pub fn render_json(result: &AnalysisResult, limits: ReportLimits) -> Result<String> {
    let body = JsonReport {
        report: limits.apply(&result.report),
        metadata: &result.metadata,
    };
    Ok(serde_json::to_string_pretty(&body)?)
}
