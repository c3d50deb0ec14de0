//! Configuration types deserialized from `roast.toml`.

use serde::Deserialize;
use std::time::Duration;

/// The top-level configuration parsed from `roast.toml`.
///
/// Every section is optional; an absent file is equivalent to an empty one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoastConfig {
    /// Where sources live and where compiled output goes.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// How the external compiler is invoked.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Where the fingerprint document is kept.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Names of the source and resource subtrees and the file extensions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Source subtree, relative to the project directory.
    pub sources: String,
    /// Resource subtree that receives compiled files, relative to the project directory.
    pub resources: String,
    /// Extension of the files to compile, without the dot.
    pub source_extension: String,
    /// Extension the compiler gives its output, without the dot.
    pub output_extension: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sources: "CoffeeSources".to_string(),
            resources: "Resources".to_string(),
            source_extension: "coffee".to_string(),
            output_extension: "js".to_string(),
        }
    }
}

/// External compiler invocation settings.
///
/// The command line is `<program> <args...> -o <target dir> <source file>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Program name or path.
    pub program: String,
    /// Leading arguments; the default asks for bare output in compile mode.
    pub args: Vec<String>,
    /// Kill the compiler after this many seconds. `None` waits forever.
    pub timeout_secs: Option<u64>,
}

impl CompilerConfig {
    /// Returns the configured timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "coffee".to_string(),
            args: vec!["-b".to_string(), "-c".to_string()],
            timeout_secs: None,
        }
    }
}

/// Fingerprint document location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory holding the document, relative to the project directory.
    /// When unset, `build/` is used if it exists, else the project directory.
    pub dir: Option<String>,
    /// File name of the document.
    pub file: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file: "coffee_file_hashes.json".to_string(),
        }
    }
}
