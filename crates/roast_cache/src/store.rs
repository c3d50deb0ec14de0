//! The fingerprint document: source path to last-good digest.
//!
//! On disk this is a single JSON object,
//! `{ "<source path>": "<32 hex chars>" | null, ... }`. A string value is the
//! digest of the content that last compiled successfully; `null` marks a file
//! whose last compile failed. A path that is not a key has never been seen.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use roast_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// In-memory fingerprint mapping, owned by a single build run.
///
/// Keys are kept sorted so that saving an unchanged store reproduces the
/// previous document byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintStore {
    entries: BTreeMap<String, Option<String>>,
}

impl FingerprintStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store from `path`.
    ///
    /// A missing or blank document yields an empty store. A document that is
    /// not an object of string to string-or-null is a [`CacheError::Parse`].
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(&text).map_err(|e| CacheError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Loads the store, falling back to an empty one if the document cannot
    /// be read or parsed.
    ///
    /// The error, if any, is handed back so the caller can report it. An
    /// empty store means every file is rebuilt, which is always safe.
    pub fn load_or_default(path: &Path) -> (Self, Option<CacheError>) {
        match Self::load(path) {
            Ok(store) => (store, None),
            Err(e) => (Self::new(), Some(e)),
        }
    }

    /// Writes the whole store to `path`, replacing any previous document.
    ///
    /// The JSON is written to a sibling temp file, synced, and renamed over
    /// the target, so a crash mid-write leaves the old document intact.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

        let temp_path = temp_path_for(path);
        let io_err = |source| CacheError::Io {
            path: temp_path.clone(),
            source,
        };

        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .and_then(|()| file.sync_all())
            .map_err(io_err)?;
        drop(file);

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            CacheError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        })
    }

    /// Returns `true` if `source` has been seen by a previous build.
    pub fn contains(&self, source: &Path) -> bool {
        self.entries.contains_key(&key(source))
    }

    /// Returns the recorded digest for `source`.
    ///
    /// `None` if the path was never seen or its last compile failed.
    pub fn digest(&self, source: &Path) -> Option<&str> {
        self.entries.get(&key(source))?.as_deref()
    }

    /// Returns `true` if the last compile of `source` failed.
    pub fn is_failed(&self, source: &Path) -> bool {
        matches!(self.entries.get(&key(source)), Some(None))
    }

    /// Returns `true` if the recorded digest equals `digest`.
    ///
    /// Unseen paths and failure markers never match.
    pub fn is_current(&self, source: &Path, digest: &ContentHash) -> bool {
        self.digest(source) == Some(digest.to_string().as_str())
    }

    /// Records a successful compile of content with the given digest.
    pub fn record_success(&mut self, source: &Path, digest: &ContentHash) {
        self.entries.insert(key(source), Some(digest.to_string()));
    }

    /// Records a failed compile; the next build retries the file.
    pub fn record_failure(&mut self, source: &Path) {
        self.entries.insert(key(source), None);
    }

    /// Number of recorded paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(path, digest-or-failure)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(path, digest)| (path.as_str(), digest.as_deref()))
    }
}

fn key(source: &Path) -> String {
    source.to_string_lossy().into_owned()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
