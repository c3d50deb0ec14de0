//! Errors that abort a build run.
//!
//! A single file failing to compile is not an error at this level; it is
//! recorded in the [`BuildReport`](crate::BuildReport) and the walk goes on.

use std::path::PathBuf;

use roast_cache::CacheError;

/// Fatal build errors.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The source subtree exists but the resource subtree does not.
    #[error("{project_dir} does not look like a project folder. {resources}/ folder not found.")]
    MissingResources {
        /// The project directory.
        project_dir: PathBuf,
        /// Name of the missing resource subtree.
        resources: String,
    },

    /// Walking the source subtree failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The directory or entry being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A walked directory is not below the source root.
    #[error("{path} is outside the source tree {source_root}")]
    OutsideSourceRoot {
        /// The offending directory.
        path: PathBuf,
        /// The source root being walked.
        source_root: PathBuf,
    },

    /// The fingerprint document could not be written.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
