//! Configuration types for tree scanning

use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

/// How entry names are compared against the search pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Plain listing, no filtering.
    #[default]
    None,
    /// Whole name equals the pattern.
    Exact,
    /// Name with its final extension removed equals the pattern.
    ExactNoExtension,
    /// Pattern occurs anywhere in the name.
    Contains,
}

impl SearchMode {
    /// Resolve the three mutually exclusive search options into a mode and pattern.
    ///
    /// At most one of the arguments may be `Some`.
    pub fn from_flags(
        exact: Option<String>,
        no_extension: Option<String>,
        contains: Option<String>,
    ) -> Result<(SearchMode, Option<String>), ConfigError> {
        let given: Vec<(SearchMode, String)> = [
            (SearchMode::Exact, exact),
            (SearchMode::ExactNoExtension, no_extension),
            (SearchMode::Contains, contains),
        ]
        .into_iter()
        .filter_map(|(mode, pattern)| pattern.map(|p| (mode, p)))
        .collect();

        match given.as_slice() {
            [] => Ok((SearchMode::None, None)),
            [(mode, pattern)] => Ok((*mode, Some(pattern.clone()))),
            [(first, _), (second, _), ..] => Err(ConfigError::ConflictingSearchModes {
                first: *first,
                second: *second,
            }),
        }
    }

    pub fn is_active(self) -> bool {
        self != SearchMode::None
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::None => "no search",
            SearchMode::Exact => "exact search (--search)",
            SearchMode::ExactNoExtension => "extension-less search (--search-noext)",
            SearchMode::Contains => "substring search (--contains)",
        };
        f.write_str(name)
    }
}

/// Configuration for one scan. Immutable once traversal starts.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    pub recursive: bool,
    /// Levels to descend when recursive. 0 = unlimited.
    pub max_depth: u64,
    pub show_permissions: bool,
    pub show_mtime: bool,
    /// Include entries whose name starts with a dot
    pub show_hidden: bool,
    pub show_files: bool,
    pub show_symlinks: bool,
    pub show_special: bool,
    /// Compute and show the recursive size of every listed directory
    pub show_dir_size: bool,
    /// Report per-entry and per-directory errors to the sink
    pub show_errors: bool,
    pub abs_paths: bool,
    /// Paths relative to the scan root, without indentation
    pub rel_paths: bool,
    pub search_mode: SearchMode,
    pub search_pattern: Option<String>,
}

impl ScanConfig {
    /// Check the cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.abs_paths && self.rel_paths {
            return Err(ConfigError::ConflictingPathStyles);
        }
        match (self.search_mode, &self.search_pattern) {
            (SearchMode::None, Some(_)) => Err(ConfigError::UnexpectedPattern),
            (mode, None) if mode.is_active() => Err(ConfigError::MissingPattern { mode }),
            _ => Ok(()),
        }
    }

    pub fn is_search(&self) -> bool {
        self.search_mode.is_active()
    }

    /// Whether a directory found at `depth` should be descended into.
    pub fn should_descend(&self, depth: u64) -> bool {
        self.recursive && (self.max_depth == 0 || depth < self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_plain_listing() {
        let config = ScanConfig::default();
        assert!(!config.recursive);
        assert_eq!(config.max_depth, 0);
        assert!(!config.is_search());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_flags_single_mode() {
        let (mode, pattern) = SearchMode::from_flags(None, None, Some("f1".into())).unwrap();
        assert_eq!(mode, SearchMode::Contains);
        assert_eq!(pattern.as_deref(), Some("f1"));

        let (mode, pattern) = SearchMode::from_flags(None, None, None).unwrap();
        assert_eq!(mode, SearchMode::None);
        assert!(pattern.is_none());
    }

    #[test]
    fn test_from_flags_conflict() {
        let err =
            SearchMode::from_flags(Some("a".into()), None, Some("b".into())).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ConflictingSearchModes {
                first: SearchMode::Exact,
                second: SearchMode::Contains,
            }
        );
    }

    #[test]
    fn test_validate_path_styles() {
        let config = ScanConfig {
            abs_paths: true,
            rel_paths: true,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ConflictingPathStyles));
    }

    #[test]
    fn test_validate_pattern_presence() {
        let missing = ScanConfig {
            search_mode: SearchMode::Exact,
            ..Default::default()
        };
        assert_eq!(
            missing.validate(),
            Err(ConfigError::MissingPattern {
                mode: SearchMode::Exact
            })
        );

        let unexpected = ScanConfig {
            search_pattern: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(unexpected.validate(), Err(ConfigError::UnexpectedPattern));
    }

    #[test]
    fn test_should_descend() {
        let flat = ScanConfig::default();
        assert!(!flat.should_descend(0));

        let unlimited = ScanConfig {
            recursive: true,
            ..Default::default()
        };
        assert!(unlimited.should_descend(0));
        assert!(unlimited.should_descend(1000));

        let bounded = ScanConfig {
            recursive: true,
            max_depth: 1,
            ..Default::default()
        };
        assert!(bounded.should_descend(0));
        assert!(!bounded.should_descend(1));
    }
}
