//! Per-directory counters and their aggregation across a scan

use std::ops::AddAssign;

use serde::Serialize;

use super::classify::EntryClassification;
use super::config::ScanConfig;

/// Counters for one scope: a directory, a subtree or a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryTally {
    pub file_count: u64,
    pub symlink_count: u64,
    pub special_count: u64,
    pub subdir_count: u64,
    /// Bytes of regular files whose size could be read
    pub total_file_bytes: u64,
}

impl DirectoryTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one entry. Unknown file sizes are counted but add no bytes.
    pub fn record(&mut self, classification: &EntryClassification) {
        match classification {
            EntryClassification::File { size } => {
                self.file_count += 1;
                if let Some(bytes) = size.known() {
                    self.total_file_bytes = self.total_file_bytes.saturating_add(bytes);
                }
            }
            EntryClassification::Symlink { .. } => self.symlink_count += 1,
            EntryClassification::Special { .. } => self.special_count += 1,
            EntryClassification::Directory => self.subdir_count += 1,
        }
    }

    /// Total number of entries across all kinds.
    pub fn total(&self) -> u64 {
        self.file_count + self.symlink_count + self.special_count + self.subdir_count
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn report(&self) -> TallyReport {
        TallyReport {
            files: self.file_count,
            symlinks: self.symlink_count,
            special: self.special_count,
            subdirectories: self.subdir_count,
            total: self.total(),
            bytes: self.total_file_bytes,
        }
    }
}

impl AddAssign for DirectoryTally {
    fn add_assign(&mut self, other: Self) {
        self.file_count += other.file_count;
        self.symlink_count += other.symlink_count;
        self.special_count += other.special_count;
        self.subdir_count += other.subdir_count;
        self.total_file_bytes = self.total_file_bytes.saturating_add(other.total_file_bytes);
    }
}

/// Serializable view of a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TallyReport {
    pub files: u64,
    pub symlinks: u64,
    pub special: u64,
    pub subdirectories: u64,
    pub total: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryScope {
    /// Direct children of the scan root
    Root,
    /// Every visited directory
    Cumulative,
    /// Entries that satisfied the search predicate and were eligible to be shown
    Matched,
    /// Everything visited in search mode
    Traversed,
}

/// Accumulates tallies for one top-level scan.
#[derive(Debug, Default)]
pub struct ScanAggregator {
    root: DirectoryTally,
    cumulative: DirectoryTally,
    matched: DirectoryTally,
    folded: usize,
    unreadable_dirs: usize,
}

impl ScanAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished directory's tally in.
    pub fn fold(&mut self, tally: DirectoryTally, depth: u64) {
        if depth == 0 {
            self.root += tally;
        }
        self.cumulative += tally;
        self.folded += 1;
    }

    /// Fold a finished directory's search matches in.
    pub fn fold_matched(&mut self, tally: DirectoryTally) {
        self.matched += tally;
    }

    /// Record a directory whose contents could not be counted.
    pub fn mark_incomplete(&mut self) {
        self.unreadable_dirs += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.unreadable_dirs == 0
    }

    /// Number of directory tallies folded so far.
    pub fn folded(&self) -> usize {
        self.folded
    }

    pub fn summary(&self, scope: SummaryScope) -> DirectoryTally {
        match scope {
            SummaryScope::Root => self.root,
            SummaryScope::Cumulative | SummaryScope::Traversed => self.cumulative,
            SummaryScope::Matched => self.matched,
        }
    }

    /// Produce the final summary for the sink.
    pub fn finish(&self, config: &ScanConfig) -> ScanSummary {
        let search = config.is_search();
        ScanSummary {
            root: self.root.report(),
            cumulative: config
                .recursive
                .then(|| self.summary(SummaryScope::Cumulative).report()),
            matched: search.then(|| self.summary(SummaryScope::Matched).report()),
            traversed: search.then(|| self.summary(SummaryScope::Traversed).report()),
            complete: self.is_complete(),
            unreadable_dirs: self.unreadable_dirs,
        }
    }
}

/// Final counts of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub root: TallyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative: Option<TallyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<TallyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversed: Option<TallyReport>,
    /// False when some directory could not be read, so counts are partial
    pub complete: bool,
    pub unreadable_dirs: usize,
}
