//! Error taxonomy for the staging and object layer.
//!
//! Every area returns [`BitResult`]. I/O failures carry the operation and the
//! path they happened on; nothing is retried internally.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum BitError {
    /// The path requested for staging does not exist.
    #[error("pathspec '{}' did not match any files", .0.display())]
    NotFound(PathBuf),

    /// A read or write against the working tree, index or object store failed.
    #[error("unable to {operation} '{}': {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted index cannot be parsed into valid entries.
    #[error("corrupt index file '{}': {reason}", .path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    /// The path matches an active ignore pattern.
    #[error("path '{}' is ignored by one of your ignore patterns", .0.display())]
    Ignored(PathBuf),

    /// A malformed object id or object envelope.
    #[error("invalid object: {0}")]
    InvalidObject(String),

    /// An invalid ignore pattern or configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BitError {
    /// Soft errors describe a request that was skipped rather than one that failed.
    pub fn is_soft(&self) -> bool {
        matches!(self, BitError::Ignored(_))
    }

    pub(crate) fn corrupt_index(path: &Path, reason: impl Into<String>) -> Self {
        BitError::CorruptIndex {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type BitResult<T> = Result<T, BitError>;

/// Attach the operation and path to a raw `std::io::Error`.
pub trait IoResultExt<T> {
    fn with_path(self, operation: &'static str, path: &Path) -> BitResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, operation: &'static str, path: &Path) -> BitResult<T> {
        self.map_err(|source| BitError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        })
    }
}
