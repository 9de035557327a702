//! Entry classification and metadata retrieval
//!
//! Symlink status is checked first and is exclusive: a symlink is reported as
//! a symlink regardless of what it points to. Only non-symlinks are tested
//! for regular file, special node and directory status, in that order.

use std::fmt;
use std::fs::{self, FileType, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::error::{MetadataField, TraversalError};

/// A byte size that may not have been readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "bytes")]
pub enum EntrySize {
    Known(u64),
    Unknown,
}

impl EntrySize {
    pub fn known(self) -> Option<u64> {
        match self {
            EntrySize::Known(bytes) => Some(bytes),
            EntrySize::Unknown => None,
        }
    }
}

/// Kind of a non-regular, non-directory, non-symlink node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialKind {
    Socket,
    BlockDevice,
    FifoPipe,
    Generic,
}

impl SpecialKind {
    pub fn label(self) -> &'static str {
        match self {
            SpecialKind::Socket => "SOCKET",
            SpecialKind::BlockDevice => "BLOCK DEVICE",
            SpecialKind::FifoPipe => "FIFO PIPE",
            SpecialKind::Generic => "SPECIAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryClassification {
    File { size: EntrySize },
    Symlink { target: Option<PathBuf> },
    Special { subtype: SpecialKind },
    Directory,
}

impl EntryClassification {
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryClassification::Directory)
    }
}

/// POSIX-style permission bits of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    mode: u32,
}

impl Permissions {
    pub fn from_mode(mode: u32) -> Self {
        Self { mode: mode & 0o7777 }
    }

    #[cfg(unix)]
    fn from_metadata(meta: &Metadata) -> Self {
        use std::os::unix::fs::PermissionsExt;
        Self::from_mode(meta.permissions().mode())
    }

    #[cfg(not(unix))]
    fn from_metadata(meta: &Metadata) -> Self {
        if meta.permissions().readonly() {
            Self::from_mode(0o444)
        } else {
            Self::from_mode(0o666)
        }
    }

    pub fn mode(self) -> u32 {
        self.mode
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const BITS: [(u32, char); 9] = [
            (0o400, 'r'),
            (0o200, 'w'),
            (0o100, 'x'),
            (0o040, 'r'),
            (0o020, 'w'),
            (0o010, 'x'),
            (0o004, 'r'),
            (0o002, 'w'),
            (0o001, 'x'),
        ];
        let rendered: String = BITS
            .iter()
            .map(|&(bit, c)| if self.mode & bit != 0 { c } else { '-' })
            .collect();
        f.write_str(&rendered)
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Which optional fields to read while classifying.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRequest {
    pub permissions: bool,
    pub modified: bool,
}

/// Result of classifying one entry.
#[derive(Debug)]
pub struct ClassifiedEntry {
    pub classification: EntryClassification,
    pub permissions: Option<Permissions>,
    pub modified: Option<DateTime<Local>>,
    /// Fields that could not be read. The entry is still usable.
    pub errors: Vec<TraversalError>,
}

/// Classify the entry at `path` without following symlinks.
pub fn classify(path: &Path) -> Result<ClassifiedEntry, TraversalError> {
    classify_with_hint(path, None, FieldRequest::default())
}

/// Classify an entry, reusing the file type the directory iterator already knows.
///
/// With a hint, a failed status query only makes the size, permissions and
/// modification time unknown. Without one it is an error for the entry.
pub fn classify_with_hint(
    path: &Path,
    hint: Option<FileType>,
    request: FieldRequest,
) -> Result<ClassifiedEntry, TraversalError> {
    let mut errors = Vec::new();

    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => Some(meta),
        Err(source) if hint.is_some() => {
            // size is always wanted; the other fields only when displayed
            let mut fields = vec![MetadataField::Size];
            if request.permissions {
                fields.push(MetadataField::Permissions);
            }
            if request.modified {
                fields.push(MetadataField::ModifiedTime);
            }
            for field in fields {
                errors.push(TraversalError::EntryMetadata {
                    path: path.to_path_buf(),
                    field,
                    source: io::Error::new(source.kind(), source.to_string()),
                });
            }
            None
        }
        Err(source) => {
            return Err(TraversalError::EntryStatus {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let Some(file_type) = hint.or_else(|| meta.as_ref().map(Metadata::file_type)) else {
        return Err(TraversalError::Unclassifiable {
            path: path.to_path_buf(),
        });
    };

    let classification = if file_type.is_symlink() {
        let target = match fs::read_link(path) {
            Ok(target) => Some(target),
            Err(source) => {
                errors.push(TraversalError::EntryMetadata {
                    path: path.to_path_buf(),
                    field: MetadataField::SymlinkTarget,
                    source,
                });
                None
            }
        };
        EntryClassification::Symlink { target }
    } else if file_type.is_file() {
        let size = meta
            .as_ref()
            .map_or(EntrySize::Unknown, |m| EntrySize::Known(m.len()));
        EntryClassification::File { size }
    } else if let Some(subtype) = special_kind(&file_type) {
        EntryClassification::Special { subtype }
    } else if file_type.is_dir() {
        EntryClassification::Directory
    } else {
        return Err(TraversalError::Unclassifiable {
            path: path.to_path_buf(),
        });
    };

    let permissions = match (&meta, request.permissions) {
        (Some(meta), true) => Some(Permissions::from_metadata(meta)),
        _ => None,
    };

    let modified = match (&meta, request.modified) {
        (Some(meta), true) => match meta.modified() {
            Ok(time) => Some(DateTime::<Local>::from(time)),
            Err(source) => {
                errors.push(TraversalError::EntryMetadata {
                    path: path.to_path_buf(),
                    field: MetadataField::ModifiedTime,
                    source,
                });
                None
            }
        },
        _ => None,
    };

    Ok(ClassifiedEntry {
        classification,
        permissions,
        modified,
        errors,
    })
}

#[cfg(unix)]
fn special_kind(file_type: &FileType) -> Option<SpecialKind> {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_socket() {
        Some(SpecialKind::Socket)
    } else if file_type.is_block_device() {
        Some(SpecialKind::BlockDevice)
    } else if file_type.is_fifo() {
        Some(SpecialKind::FifoPipe)
    } else if file_type.is_char_device() {
        Some(SpecialKind::Generic)
    } else {
        None
    }
}

#[cfg(not(unix))]
fn special_kind(file_type: &FileType) -> Option<SpecialKind> {
    if file_type.is_file() || file_type.is_dir() || file_type.is_symlink() {
        None
    } else {
        Some(SpecialKind::Generic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("five.txt");
        fs::write(&path, "12345").unwrap();

        let entry = classify(&path).unwrap();
        assert_eq!(
            entry.classification,
            EntryClassification::File {
                size: EntrySize::Known(5)
            }
        );
        assert!(entry.errors.is_empty());
        assert!(entry.permissions.is_none());
        assert!(entry.modified.is_none());
    }

    #[test]
    fn test_classify_directory() {
        let dir = TempDir::new().unwrap();
        let entry = classify(dir.path()).unwrap();
        assert!(entry.classification.is_dir());
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_takes_precedence() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("real");
        fs::create_dir(&target).unwrap();
        let link = dir.path().join("link");
        symlink(&target, &link).unwrap();

        let entry = classify(&link).unwrap();
        assert_eq!(
            entry.classification,
            EntryClassification::Symlink {
                target: Some(target)
            }
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_broken_symlink_still_classified() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let link = dir.path().join("dangling");
        symlink("does-not-exist", &link).unwrap();

        let entry = classify(&link).unwrap();
        assert_eq!(
            entry.classification,
            EntryClassification::Symlink {
                target: Some(PathBuf::from("does-not-exist"))
            }
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_classify_fifo() {
        let dir = TempDir::new().unwrap();
        let fifo = dir.path().join("pipe");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .expect("mkfifo should be available");
        assert!(status.success());

        let entry = classify(&fifo).unwrap();
        assert_eq!(
            entry.classification,
            EntryClassification::Special {
                subtype: SpecialKind::FifoPipe
            }
        );
    }

    #[test]
    fn test_missing_entry_without_hint_is_error() {
        let dir = TempDir::new().unwrap();
        let err = classify(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, TraversalError::EntryStatus { .. }));
    }

    #[test]
    fn test_missing_entry_with_hint_has_unknown_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vanishing.txt");
        fs::write(&path, "data").unwrap();
        let hint = fs::symlink_metadata(&path).unwrap().file_type();
        fs::remove_file(&path).unwrap();

        let request = FieldRequest {
            permissions: true,
            modified: true,
        };
        let entry = classify_with_hint(&path, Some(hint), request).unwrap();
        assert_eq!(
            entry.classification,
            EntryClassification::File {
                size: EntrySize::Unknown
            }
        );
        assert!(entry.permissions.is_none());
        assert!(entry.modified.is_none());
        assert_eq!(entry.errors.len(), 3);
    }

    #[test]
    fn test_requested_fields_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "a").unwrap();

        let request = FieldRequest {
            permissions: true,
            modified: true,
        };
        let entry = classify_with_hint(&path, None, request).unwrap();
        assert!(entry.permissions.is_some());
        assert!(entry.modified.is_some());
    }

    #[test]
    fn test_permissions_display() {
        assert_eq!(Permissions::from_mode(0o755).to_string(), "rwxr-xr-x");
        assert_eq!(Permissions::from_mode(0o644).to_string(), "rw-r--r--");
        assert_eq!(Permissions::from_mode(0o100600).to_string(), "rw-------");
        assert_eq!(Permissions::from_mode(0).to_string(), "---------");
    }

    #[test]
    fn test_special_labels() {
        assert_eq!(SpecialKind::Socket.label(), "SOCKET");
        assert_eq!(SpecialKind::BlockDevice.label(), "BLOCK DEVICE");
        assert_eq!(SpecialKind::FifoPipe.label(), "FIFO PIPE");
        assert_eq!(SpecialKind::Generic.label(), "SPECIAL");
    }
}
