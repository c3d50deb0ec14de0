//! Project structure checks and cache location resolution.

use std::path::{Path, PathBuf};

use crate::types::RoastConfig;

/// Result of checking a project directory before building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutStatus {
    /// The source subtree does not exist; there is nothing to compile.
    NoSources {
        /// The source subtree that was looked for.
        source_root: PathBuf,
    },
    /// Sources exist but the resource subtree is missing, so this does not
    /// look like a project the build step can write into.
    MissingResources {
        /// The resource subtree that was looked for.
        resource_root: PathBuf,
    },
    /// Both subtrees exist.
    Ready {
        /// Root of the source subtree.
        source_root: PathBuf,
        /// Root of the resource subtree.
        resource_root: PathBuf,
    },
}

/// Checks that the project has the subtrees the build needs.
pub fn check_layout(project_dir: &Path, config: &RoastConfig) -> LayoutStatus {
    let source_root = project_dir.join(&config.layout.sources);
    let resource_root = project_dir.join(&config.layout.resources);

    if !source_root.is_dir() {
        LayoutStatus::NoSources { source_root }
    } else if !resource_root.is_dir() {
        LayoutStatus::MissingResources { resource_root }
    } else {
        LayoutStatus::Ready {
            source_root,
            resource_root,
        }
    }
}

/// Returns the directory that holds the fingerprint document.
///
/// An explicit `cache.dir` wins. Otherwise `<project>/build` is used when it
/// exists, falling back to the project directory itself.
pub fn resolve_cache_dir(project_dir: &Path, config: &RoastConfig) -> PathBuf {
    if let Some(ref dir) = config.cache.dir {
        return project_dir.join(dir);
    }
    let build_dir = project_dir.join("build");
    if build_dir.is_dir() {
        build_dir
    } else {
        project_dir.to_path_buf()
    }
}

/// Returns the full path of the fingerprint document.
pub fn resolve_cache_file(project_dir: &Path, config: &RoastConfig) -> PathBuf {
    resolve_cache_dir(project_dir, config).join(&config.cache.file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn no_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Resources")).unwrap();
        let status = check_layout(dir.path(), &RoastConfig::default());
        assert_eq!(
            status,
            LayoutStatus::NoSources {
                source_root: dir.path().join("CoffeeSources")
            }
        );
    }

    #[test]
    fn missing_resources() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("CoffeeSources")).unwrap();
        let status = check_layout(dir.path(), &RoastConfig::default());
        assert_eq!(
            status,
            LayoutStatus::MissingResources {
                resource_root: dir.path().join("Resources")
            }
        );
    }

    #[test]
    fn ready() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("CoffeeSources")).unwrap();
        fs::create_dir(dir.path().join("Resources")).unwrap();
        let status = check_layout(dir.path(), &RoastConfig::default());
        assert_eq!(
            status,
            LayoutStatus::Ready {
                source_root: dir.path().join("CoffeeSources"),
                resource_root: dir.path().join("Resources"),
            }
        );
    }

    #[test]
    fn source_file_named_like_subtree_is_not_a_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("CoffeeSources"), "not a directory").unwrap();
        let status = check_layout(dir.path(), &RoastConfig::default());
        assert!(matches!(status, LayoutStatus::NoSources { .. }));
    }

    #[test]
    fn cache_dir_defaults_to_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = RoastConfig::default();
        assert_eq!(resolve_cache_dir(dir.path(), &config), dir.path());
        assert_eq!(
            resolve_cache_file(dir.path(), &config),
            dir.path().join("coffee_file_hashes.json")
        );
    }

    #[test]
    fn cache_dir_prefers_build_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();
        assert_eq!(
            resolve_cache_dir(dir.path(), &RoastConfig::default()),
            dir.path().join("build")
        );
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();
        let mut config = RoastConfig::default();
        config.cache.dir = Some(".roast".to_string());
        assert_eq!(
            resolve_cache_dir(dir.path(), &config),
            dir.path().join(".roast")
        );
    }
}
