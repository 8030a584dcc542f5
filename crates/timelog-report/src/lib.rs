//! Report rendering for timelog.
//!
//! Turns an [`timelog_data::analysis::AnalysisResult`] into either aligned,
//! optionally coloured text tables or a pretty-printed JSON document.

pub mod json_view;
pub mod table_view;
pub mod themes;

pub use json_view::render_json;
pub use table_view::{render_report, ReportLimits};
pub use themes::Theme;
