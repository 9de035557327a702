//! Name matching for search mode
//!
//! `Contains` searches use Knuth-Morris-Pratt over the UTF-8 bytes of the
//! name. Because UTF-8 is self-synchronizing, a byte-level match is always a
//! match on character boundaries, so results agree with `str::contains`.

use std::path::Path;

use super::config::{ScanConfig, SearchMode};

/// Longest-proper-prefix-that-is-also-a-suffix table for a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTable(Vec<usize>);

impl PrefixTable {
    pub fn new(pattern: &[u8]) -> Self {
        let mut table = vec![0; pattern.len()];
        let mut len = 0;

        for i in 1..pattern.len() {
            while len > 0 && pattern[i] != pattern[len] {
                len = table[len - 1];
            }
            if pattern[i] == pattern[len] {
                len += 1;
            }
            table[i] = len;
        }

        Self(table)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

/// Find the first occurrence of `pattern` in `haystack`.
///
/// `table` must have been built from the same `pattern`. Returns the byte
/// offset of the match. An empty pattern matches at offset 0.
pub fn kmp_find(haystack: &[u8], pattern: &[u8], table: &PrefixTable) -> Option<usize> {
    if pattern.is_empty() {
        return Some(0);
    }

    let table = table.as_slice();
    let mut matched = 0;

    for (i, &byte) in haystack.iter().enumerate() {
        while matched > 0 && byte != pattern[matched] {
            matched = table[matched - 1];
        }
        if byte == pattern[matched] {
            matched += 1;
        }
        if matched == pattern.len() {
            return Some(i + 1 - matched);
        }
    }

    None
}

/// Search predicate applied to entry names.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    mode: SearchMode,
    pattern: String,
    table: PrefixTable,
}

impl NameMatcher {
    pub fn new(mode: SearchMode, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        // only Contains consults the table
        let table = PrefixTable::new(pattern.as_bytes());
        Self {
            mode,
            pattern,
            table,
        }
    }

    /// Build the matcher for a config, or `None` when search is off.
    pub fn from_config(config: &ScanConfig) -> Option<Self> {
        if !config.is_search() {
            return None;
        }
        let pattern = config.search_pattern.as_deref()?;
        Some(Self::new(config.search_mode, pattern))
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check a name (and its extension-less stem) against the pattern.
    pub fn matches(&self, name: &str, stem: &str) -> bool {
        match self.mode {
            SearchMode::None => true,
            SearchMode::Exact => name == self.pattern,
            SearchMode::ExactNoExtension => stem == self.pattern,
            SearchMode::Contains => {
                kmp_find(name.as_bytes(), self.pattern.as_bytes(), &self.table).is_some()
            }
        }
    }

    /// Like [`matches`](Self::matches), deriving the stem from the name.
    pub fn matches_path_name(&self, name: &str) -> bool {
        self.matches(name, &file_stem(name))
    }
}

/// File name with its final extension removed (`file.tar.gz` -> `file.tar`).
pub fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
