//! JSON output formatting

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::error::TraversalError;
use crate::scan::{RollUp, ScanEntry, ScanSink, ScanSummary};

/// A traversal error as it appears in JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    pub path: PathBuf,
    pub message: String,
}

/// Whole scan result, serialized in one piece.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub root: PathBuf,
    pub entries: Vec<ScanEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rollups: Vec<RollUp>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScanSummary>,
}

/// Sink that buffers the scan for JSON serialization.
///
/// JSON cannot be streamed line by line like the console report, so
/// everything is kept until [`into_report`](Self::into_report).
pub struct JsonCollector {
    report: JsonReport,
}

impl JsonCollector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            report: JsonReport {
                root: root.into(),
                entries: Vec::new(),
                rollups: Vec::new(),
                errors: Vec::new(),
                summary: None,
            },
        }
    }

    pub fn into_report(self) -> JsonReport {
        self.report
    }
}

impl ScanSink for JsonCollector {
    fn entry(&mut self, entry: &ScanEntry) -> io::Result<()> {
        self.report.entries.push(entry.clone());
        Ok(())
    }

    fn rollup(&mut self, rollup: &RollUp) -> io::Result<()> {
        self.report.rollups.push(rollup.clone());
        Ok(())
    }

    fn error(&mut self, error: &TraversalError) -> io::Result<()> {
        self.report.errors.push(JsonError {
            path: error.path().to_path_buf(),
            message: error.to_string(),
        });
        Ok(())
    }

    fn finish(&mut self, summary: &ScanSummary) -> io::Result<()> {
        self.report.summary = Some(summary.clone());
        Ok(())
    }
}

/// Print the report as pretty-printed JSON to stdout.
pub fn print_json(report: &JsonReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)
}
