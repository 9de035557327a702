//! TreeWalker - recursive descent in listing or search mode

use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConfigError, ScanError, TraversalError};

use super::classify::{
    ClassifiedEntry, EntryClassification, EntrySize, FieldRequest, classify_with_hint,
};
use super::config::ScanConfig;
use super::dir_size::dir_size;
use super::matcher::NameMatcher;
use super::sink::{RollUp, RollUpKind, ScanEntry, ScanSink};
use super::tally::{DirectoryTally, ScanAggregator, ScanSummary};
use super::utils::{entry_name, is_hidden};

/// Depth-first directory walker.
///
/// Every entry is classified and counted. In listing mode entries are
/// emitted according to the `show_*` flags, with roll-up lines for hidden
/// kinds. In search mode only entries whose name matches are emitted, while
/// the whole tree is still traversed and counted.
pub struct TreeWalker {
    config: ScanConfig,
    matcher: Option<NameMatcher>,
}

impl TreeWalker {
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let matcher = NameMatcher::from_config(&config);
        Ok(Self { config, matcher })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Resolve the root the same way [`walk`](Self::walk) does.
    pub fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
        let meta = fs::metadata(root).map_err(|e| ScanError::root(root, e))?;
        if !meta.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        Ok(fs::canonicalize(root).unwrap_or_else(|err| {
            warn!(path = %root.display(), error = %err, "cannot canonicalize scan root");
            root.to_path_buf()
        }))
    }

    /// Scan `root` and stream the results into `sink`.
    pub fn walk<S: ScanSink>(&self, root: &Path, sink: &mut S) -> Result<ScanSummary, ScanError> {
        let root = Self::resolve_root(root)?;
        debug!(root = %root.display(), search = ?self.config.search_mode, "starting scan");

        let mut aggregator = ScanAggregator::new();
        self.walk_dir(&root, 0, &mut aggregator, sink)?;

        let summary = aggregator.finish(&self.config);
        debug!(
            directories = aggregator.folded(),
            complete = summary.complete,
            "scan finished"
        );
        sink.finish(&summary)?;
        Ok(summary)
    }

    fn walk_dir<S: ScanSink>(
        &self,
        path: &Path,
        depth: u64,
        aggregator: &mut ScanAggregator,
        sink: &mut S,
    ) -> io::Result<()> {
        let Some(entries) = self.read_entries(path, sink)? else {
            aggregator.mark_incomplete();
            return Ok(());
        };
        debug!(path = %path.display(), depth, entries = entries.len(), "scanning directory");

        let mut tally = DirectoryTally::new();
        let mut matched = DirectoryTally::new();

        for entry in entries {
            let name = entry_name(&entry);
            if !self.config.show_hidden && is_hidden(&name) {
                continue;
            }

            let entry_path = entry.path();
            let hint = entry.file_type().ok();
            let ClassifiedEntry {
                classification,
                permissions,
                modified,
                errors,
            } = match classify_with_hint(&entry_path, hint, self.field_request()) {
                Ok(classified) => classified,
                Err(err) => {
                    self.report(sink, err)?;
                    continue;
                }
            };
            for err in errors {
                self.report(sink, err)?;
            }

            tally.record(&classification);

            let emit = self.is_shown(&classification)
                && self
                    .matcher
                    .as_ref()
                    .is_none_or(|m| m.matches_path_name(&name));
            if emit && self.matcher.is_some() {
                matched.record(&classification);
            }

            let is_dir = classification.is_dir();
            if emit {
                let dir_size = if is_dir && self.config.show_dir_size {
                    Some(self.measure(&entry_path, sink)?)
                } else {
                    None
                };
                sink.entry(&ScanEntry {
                    name,
                    path: entry_path.clone(),
                    depth,
                    classification,
                    dir_size,
                    permissions,
                    modified,
                })?;
            }

            if is_dir && self.config.should_descend(depth) {
                self.walk_dir(&entry_path, depth + 1, aggregator, sink)?;
            }
        }

        if self.matcher.is_none() {
            self.emit_rollups(path, depth, &tally, sink)?;
        } else {
            aggregator.fold_matched(matched);
        }
        aggregator.fold(tally, depth);
        Ok(())
    }

    /// Collect a directory's entries sorted by name, closing the handle.
    ///
    /// Returns `None` when the directory cannot be opened.
    fn read_entries<S: ScanSink>(
        &self,
        path: &Path,
        sink: &mut S,
    ) -> io::Result<Option<Vec<DirEntry>>> {
        let iter = match fs::read_dir(path) {
            Ok(iter) => iter,
            Err(source) => {
                self.report(
                    sink,
                    TraversalError::DirectoryIterator {
                        path: path.to_path_buf(),
                        source,
                    },
                )?;
                return Ok(None);
            }
        };

        let mut entries = Vec::new();
        for entry in iter {
            match entry {
                Ok(e) => entries.push(e),
                Err(source) => self.report(
                    sink,
                    TraversalError::DirectoryEntry {
                        dir: path.to_path_buf(),
                        source,
                    },
                )?,
            }
        }
        entries.sort_by_key(|e| e.file_name());
        Ok(Some(entries))
    }

    fn measure<S: ScanSink>(
        &self,
        path: &Path,
        sink: &mut S,
    ) -> io::Result<EntrySize> {
        let mut errors = Vec::new();
        let size = dir_size(path, &mut errors);
        for err in errors {
            self.report(sink, err)?;
        }
        Ok(size)
    }

    fn emit_rollups<S: ScanSink>(
        &self,
        dir: &Path,
        depth: u64,
        tally: &DirectoryTally,
        sink: &mut S,
    ) -> io::Result<()> {
        let candidates = [
            (
                RollUpKind::Files,
                self.config.show_files,
                tally.file_count,
                Some(tally.total_file_bytes),
            ),
            (
                RollUpKind::Symlinks,
                self.config.show_symlinks,
                tally.symlink_count,
                None,
            ),
            (
                RollUpKind::Special,
                self.config.show_special,
                tally.special_count,
                None,
            ),
        ];

        for (kind, shown, count, bytes) in candidates {
            if !shown && count > 0 {
                sink.rollup(&RollUp {
                    kind,
                    count,
                    bytes,
                    depth,
                    dir: dir.to_path_buf(),
                })?;
            }
        }
        Ok(())
    }

    /// Directories are always shown; other kinds follow their flag.
    fn is_shown(&self, classification: &EntryClassification) -> bool {
        match classification {
            EntryClassification::Directory => true,
            EntryClassification::File { .. } => self.config.show_files,
            EntryClassification::Symlink { .. } => self.config.show_symlinks,
            EntryClassification::Special { .. } => self.config.show_special,
        }
    }

    fn field_request(&self) -> FieldRequest {
        FieldRequest {
            permissions: self.config.show_permissions,
            modified: self.config.show_mtime,
        }
    }

    fn report<S: ScanSink>(&self, sink: &mut S, error: TraversalError) -> io::Result<()> {
        debug!(path = %error.path().display(), error = %error, "traversal error");
        if self.config.show_errors {
            sink.error(&error)?;
        }
        Ok(())
    }
}
