//! Source file hashing.

use std::path::Path;

use roast_common::ContentHash;

use crate::error::CacheError;

/// Utility for computing content hashes of source files.
pub struct SourceHasher;

impl SourceHasher {
    /// Reads a file and returns the hash of its raw bytes.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }
}
