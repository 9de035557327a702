//! Report formatting and display
//!
//! - `config` - Output configuration types
//! - `report` - Column-aligned console report
//! - `json` - JSON output

mod config;
mod json;
mod report;

pub use config::{OutputConfig, PathStyle};
pub use json::{JsonCollector, JsonError, JsonReport, print_json};
pub use report::{ReportFormatter, format_timestamp, summary_line};
