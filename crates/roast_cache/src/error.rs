//! Error types for fingerprint cache operations.

use std::path::PathBuf;

/// Errors that can occur while reading, writing, or hashing.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The fingerprint document is not a JSON object of string to string-or-null.
    #[error("failed to parse fingerprint cache {path}: {reason}")]
    Parse {
        /// The document path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The store could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
