//! Output configuration types

use std::path::PathBuf;

/// How entry names are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathStyle {
    /// Bare name, indented by depth
    #[default]
    Indented,
    /// Full canonical path
    Absolute,
    /// Path relative to the scan root
    Relative,
}

/// Configuration for output formatting.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub use_color: bool,
    pub path_style: PathStyle,
    /// Reserve a permissions column
    pub show_permissions: bool,
    /// Reserve a modification time column
    pub show_mtime: bool,
    /// Canonical scan root, used for relative paths
    pub root: PathBuf,
}
