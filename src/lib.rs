//! Treescan - scan a directory tree, classify its entries and summarize them

pub mod error;
pub mod output;
pub mod scan;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{ConfigError, MetadataField, ScanError, TraversalError};
pub use output::{
    JsonCollector, JsonReport, OutputConfig, PathStyle, ReportFormatter, print_json,
};
pub use scan::{
    CollectingSink, EntryClassification, EntrySize, NameMatcher, RollUp, RollUpKind, ScanConfig,
    ScanEntry, ScanSink, ScanSummary, SearchMode, TreeWalker, classify, dir_size, kmp_find,
};
