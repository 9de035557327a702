//! Recursive apparent-size calculation for a directory subtree

use std::fs;
use std::path::Path;

use tracing::trace;

use crate::error::TraversalError;

use super::classify::EntrySize;

/// Sum the byte size of every regular file below `path`.
///
/// Symlinks are never followed, so cyclic links terminate. Unreadable
/// entries and nested directories are skipped and their errors pushed to
/// `errors`; only a failure to open `path` itself gives `Unknown`.
pub fn dir_size(path: &Path, errors: &mut Vec<TraversalError>) -> EntrySize {
    match subtree_size(path, errors) {
        Ok(bytes) => EntrySize::Known(bytes),
        Err(err) => {
            errors.push(err);
            EntrySize::Unknown
        }
    }
}

fn subtree_size(path: &Path, errors: &mut Vec<TraversalError>) -> Result<u64, TraversalError> {
    let entries = fs::read_dir(path).map_err(|source| TraversalError::DirectoryIterator {
        path: path.to_path_buf(),
        source,
    })?;

    let mut total = 0u64;
    let mut subdirs = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(source) => {
                errors.push(TraversalError::DirectoryEntry {
                    dir: path.to_path_buf(),
                    source,
                });
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(source) => {
                errors.push(TraversalError::EntryStatus {
                    path: entry.path(),
                    source,
                });
                continue;
            }
        };

        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else if file_type.is_file() {
            match entry.metadata() {
                Ok(meta) => total = total.saturating_add(meta.len()),
                Err(source) => errors.push(TraversalError::EntryStatus {
                    path: entry.path(),
                    source,
                }),
            }
        }
    }

    // handle is closed before descending
    for subdir in subdirs {
        match subtree_size(&subdir, errors) {
            Ok(bytes) => total = total.saturating_add(bytes),
            Err(err) => errors.push(err),
        }
    }

    trace!(path = %path.display(), bytes = total, "measured directory");
    Ok(total)
}
