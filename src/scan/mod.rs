//! Directory scanning engine
//!
//! - `config` - Scan configuration and search mode resolution
//! - `matcher` - Name predicates for search mode, including KMP substring search
//! - `classify` - Entry kind and metadata retrieval
//! - `dir_size` - Recursive subtree size
//! - `tally` - Per-directory counters and scan-wide aggregation
//! - `sink` - Output trait the walker streams into
//! - `walker` - Recursive descent in listing or search mode

mod classify;
mod config;
mod dir_size;
mod matcher;
mod sink;
mod tally;
mod utils;
mod walker;

pub use classify::{
    ClassifiedEntry, EntryClassification, EntrySize, FieldRequest, Permissions, SpecialKind,
    classify, classify_with_hint,
};
pub use config::{ScanConfig, SearchMode};
pub use dir_size::dir_size;
pub use matcher::{NameMatcher, PrefixTable, file_stem, kmp_find};
pub use sink::{CollectingSink, RollUp, RollUpKind, ScanEntry, ScanSink};
pub use tally::{DirectoryTally, ScanAggregator, ScanSummary, SummaryScope, TallyReport};
pub use utils::{format_size, is_hidden};
pub use walker::TreeWalker;
