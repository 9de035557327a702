//! What the walker hands to its output collaborator

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::TraversalError;

use super::classify::{EntryClassification, EntrySize, Permissions};
use super::tally::ScanSummary;

/// One classified entry selected for display.
#[derive(Debug, Clone, Serialize)]
pub struct ScanEntry {
    pub name: String,
    /// Absolute path, derived from the canonical scan root
    pub path: PathBuf,
    /// Depth of the directory containing this entry (root children are 0)
    pub depth: u64,
    #[serde(flatten)]
    pub classification: EntryClassification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir_size: Option<EntrySize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Local>>,
}

impl ScanEntry {
    /// File size, or directory size when it was computed.
    pub fn size(&self) -> Option<EntrySize> {
        match &self.classification {
            EntryClassification::File { size } => Some(*size),
            EntryClassification::Directory => self.dir_size,
            _ => None,
        }
    }

    /// Path relative to `root`, falling back to the absolute path.
    pub fn relative_to(&self, root: &Path) -> &Path {
        self.path.strip_prefix(root).unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RollUpKind {
    Files,
    Symlinks,
    Special,
}

/// Stand-in line for entries of a kind that is not shown individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollUp {
    pub kind: RollUpKind,
    pub count: u64,
    /// Total size, for files only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    pub depth: u64,
    pub dir: PathBuf,
}

/// Receives the scan as it happens.
pub trait ScanSink {
    fn entry(&mut self, entry: &ScanEntry) -> io::Result<()>;

    fn rollup(&mut self, rollup: &RollUp) -> io::Result<()>;

    /// Only called when error display is enabled.
    fn error(&mut self, error: &TraversalError) -> io::Result<()>;

    fn finish(&mut self, summary: &ScanSummary) -> io::Result<()>;
}

/// Sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub entries: Vec<ScanEntry>,
    pub rollups: Vec<RollUp>,
    pub errors: Vec<String>,
    pub summary: Option<ScanSummary>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of collected entries, in emission order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

impl ScanSink for CollectingSink {
    fn entry(&mut self, entry: &ScanEntry) -> io::Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn rollup(&mut self, rollup: &RollUp) -> io::Result<()> {
        self.rollups.push(rollup.clone());
        Ok(())
    }

    fn error(&mut self, error: &TraversalError) -> io::Result<()> {
        self.errors.push(error.to_string());
        Ok(())
    }

    fn finish(&mut self, summary: &ScanSummary) -> io::Result<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}
