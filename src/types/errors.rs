use std::fmt;

use super::bookmark::NodeId;

// === BookmarkError ===

/// Errors related to bookmark tree operations.
///
/// A rejected operation leaves the tree and both indexes untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkError {
    /// The node kind does not support the requested value (e.g. a URL on a folder).
    InvalidKind(String),
    /// The requested parent/child combination is not allowed.
    StructuralViolation(String),
    /// The keyword is already held by another node.
    DuplicateKeyword(String),
    /// No live node has the given id.
    NotFound(NodeId),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::InvalidKind(msg) => write!(f, "Invalid bookmark kind: {}", msg),
            BookmarkError::StructuralViolation(msg) => {
                write!(f, "Bookmark structure violation: {}", msg)
            }
            BookmarkError::DuplicateKeyword(keyword) => {
                write!(f, "Duplicate bookmark keyword: {}", keyword)
            }
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
        }
    }
}

impl std::error::Error for BookmarkError {}

// === ImportError ===

/// Errors related to importing bookmarks.
#[derive(Debug)]
pub enum ImportError {
    /// The import source path could not be used.
    InvalidPath(String),
    /// Applying an imported entry to the tree failed.
    Bookmark(BookmarkError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::InvalidPath(path) => write!(f, "Invalid import path: {}", path),
            ImportError::Bookmark(err) => write!(f, "Import failed: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Bookmark(err) => Some(err),
            ImportError::InvalidPath(_) => None,
        }
    }
}

impl From<BookmarkError> for ImportError {
    fn from(err: BookmarkError) -> Self {
        ImportError::Bookmark(err)
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
