//! Error types for configuration and scanning.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::scan::SearchMode;

/// A contradictory or incomplete scan configuration.
///
/// Always detected before traversal starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// More than one search mode was requested.
    #[error("only one search mode can be used at a time ({first} and {second} were both given)")]
    ConflictingSearchModes {
        first: SearchMode,
        second: SearchMode,
    },

    /// Absolute and relative path output were both requested.
    #[error("absolute and relative path output cannot be combined")]
    ConflictingPathStyles,

    /// A search mode was selected without a pattern.
    #[error("no search pattern provided for {mode}")]
    MissingPattern { mode: SearchMode },

    /// A pattern was supplied while search is off.
    #[error("a search pattern was provided but no search mode is active")]
    UnexpectedPattern,
}

/// The piece of entry metadata that could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Size,
    Permissions,
    ModifiedTime,
    SymlinkTarget,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetadataField::Size => "size",
            MetadataField::Permissions => "permissions",
            MetadataField::ModifiedTime => "modification time",
            MetadataField::SymlinkTarget => "symlink target",
        };
        f.write_str(name)
    }
}

/// Non-fatal problem encountered while walking the tree.
///
/// None of these abort a scan. They are reported to the sink when
/// `show_errors` is set and always logged.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// A directory could not be opened or iterated.
    #[error("cannot read directory {}: {source}", path.display())]
    DirectoryIterator {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The directory iterator yielded an error instead of an entry.
    #[error("cannot read an entry of {}: {source}", dir.display())]
    DirectoryEntry {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The status of an entry could not be queried at all.
    #[error("cannot query {}: {source}", path.display())]
    EntryStatus {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One metadata field of an entry could not be read.
    #[error("cannot read {field} of {}: {source}", path.display())]
    EntryMetadata {
        path: PathBuf,
        field: MetadataField,
        #[source]
        source: io::Error,
    },

    /// The entry is neither a file, directory, symlink nor special node.
    #[error("file type of {} can not be determined", path.display())]
    Unclassifiable { path: PathBuf },
}

impl TraversalError {
    /// Path the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            TraversalError::DirectoryIterator { path, .. }
            | TraversalError::EntryStatus { path, .. }
            | TraversalError::EntryMetadata { path, .. }
            | TraversalError::Unclassifiable { path } => path,
            TraversalError::DirectoryEntry { dir, .. } => dir,
        }
    }

    /// Whether this error makes a whole subtree unavailable.
    pub fn is_directory_failure(&self) -> bool {
        matches!(self, TraversalError::DirectoryIterator { .. })
    }
}

/// Errors that end a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Root path does not exist.
    #[error("the given path \"{}\" does not exist", path.display())]
    NotFound { path: PathBuf },

    /// Root path is not a directory.
    #[error("the given path \"{}\" is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Root path exists but its status cannot be read.
    #[error("cannot access \"{}\": {source}", path.display())]
    RootAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sink failed to write output.
    #[error("error writing output: {0}")]
    Output(#[from] io::Error),
}

impl ScanError {
    /// Map a failed root lookup to the matching variant.
    pub fn root(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::RootAccess { path, source },
        }
    }
}
