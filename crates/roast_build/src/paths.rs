//! Mapping from the source subtree to the parallel resource subtree.
//!
//! `<project>/CoffeeSources/sub/dir/x.coffee` compiles into
//! `<project>/Resources/sub/dir/x.js`. Only the leading source-root prefix is
//! rewritten, compared component by component, so a directory that happens
//! to share the source subtree's name deeper in the path (or a project
//! directory whose own name contains it) is left alone.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use roast_cache::{CacheError, SourceHasher};
use roast_common::ContentHash;

/// Returns the resource directory that mirrors `dir`.
///
/// `None` if `dir` is not `source_root` or below it.
pub fn target_dir(source_root: &Path, resource_root: &Path, dir: &Path) -> Option<PathBuf> {
    let relative = dir.strip_prefix(source_root).ok()?;
    if relative.as_os_str().is_empty() {
        Some(resource_root.to_path_buf())
    } else {
        Some(resource_root.join(relative))
    }
}

/// Returns true if the file name of `path` ends in `.<extension>`.
///
/// A file named exactly `.coffee` counts, unlike with [`Path::extension`].
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .and_then(|name| name.strip_suffix(extension))
        .is_some_and(|rest| rest.ends_with('.'))
}

/// Returns the output file for `source` inside `target_dir`: the file name
/// with its `.<source_extension>` suffix replaced by `.<output_extension>`.
pub fn output_file(
    target_dir: &Path,
    source: &Path,
    source_extension: &str,
    output_extension: &str,
) -> PathBuf {
    let base = source
        .file_name()
        .and_then(OsStr::to_str)
        .and_then(|name| name.strip_suffix(source_extension))
        .and_then(|rest| rest.strip_suffix('.'))
        .map(OsString::from)
        .unwrap_or_else(|| source.file_stem().unwrap_or(source.as_os_str()).to_os_string());
    let mut name = base;
    name.push(".");
    name.push(output_extension);
    target_dir.join(name)
}

/// One candidate input of a walk. Rebuilt from disk every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the source file as walked.
    pub path: PathBuf,
    /// Digest of the file's current bytes.
    pub digest: ContentHash,
    /// Resource directory the compiler writes into.
    pub target_dir: PathBuf,
    /// Expected compiler output.
    pub output_path: PathBuf,
}

impl SourceFile {
    /// Reads and hashes `path`; `output_path` is its expected compiler output.
    pub fn load(path: &Path, target_dir: &Path, output_path: PathBuf) -> Result<Self, CacheError> {
        Ok(Self {
            path: path.to_path_buf(),
            digest: SourceHasher::hash_file(path)?,
            target_dir: target_dir.to_path_buf(),
            output_path,
        })
    }
}
