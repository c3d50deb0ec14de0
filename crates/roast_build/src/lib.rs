//! Incremental compilation of a project's CoffeeScript sources.
//!
//! A run walks the source subtree, hashes every source file, and compiles
//! only the files whose output is missing or whose content changed since the
//! last successful compile. Results are written into the parallel resource
//! subtree. The fingerprint document is loaded once before the walk and saved
//! once after it; a run that is interrupted leaves the previous document as
//! it was.
//!
//! Everything runs on the calling thread, one compiler process at a time.

#![warn(missing_docs)]

pub mod builder;
pub mod compiler;
pub mod error;
pub mod paths;

use std::path::{Path, PathBuf};

use roast_cache::FingerprintStore;
use roast_config::{check_layout, resolve_cache_file, LayoutStatus, RoastConfig};
use roast_diagnostics::Console;

pub use builder::{build_all, BuildLayout, BuildOutcome, BuildReport, Builder, FileReport};
pub use compiler::{CompileResult, Compiler, ExternalCompiler};
pub use error::BuildError;
pub use paths::{has_extension, output_file, target_dir, SourceFile};

/// What a project-level run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The source subtree does not exist; nothing was touched.
    NothingToDo {
        /// The source subtree that was looked for.
        source_root: PathBuf,
    },
    /// The tree was walked and the fingerprint document saved.
    Built(BuildReport),
}

/// Builds the project at `project_dir` with the compiler from `config`.
pub fn run(
    project_dir: &Path,
    config: &RoastConfig,
    console: &dyn Console,
) -> Result<RunOutcome, BuildError> {
    let compiler = ExternalCompiler::from_config(&config.compiler);
    compile_project(project_dir, config, &compiler, console)
}

/// Builds the project at `project_dir` with an arbitrary [`Compiler`].
///
/// Checks the project layout first; a missing resource subtree fails before
/// any file is looked at. An unreadable fingerprint document is reported and
/// replaced by an empty one, which rebuilds everything. Failing to save the
/// document at the end is an error.
pub fn compile_project(
    project_dir: &Path,
    config: &RoastConfig,
    compiler: &dyn Compiler,
    console: &dyn Console,
) -> Result<RunOutcome, BuildError> {
    let (source_root, resource_root) = match check_layout(project_dir, config) {
        LayoutStatus::NoSources { source_root } => {
            return Ok(RunOutcome::NothingToDo { source_root })
        }
        LayoutStatus::MissingResources { .. } => {
            return Err(BuildError::MissingResources {
                project_dir: project_dir.to_path_buf(),
                resources: config.layout.resources.clone(),
            })
        }
        LayoutStatus::Ready {
            source_root,
            resource_root,
        } => (source_root, resource_root),
    };

    let cache_file = resolve_cache_file(project_dir, config);
    let (mut store, load_error) = FingerprintStore::load_or_default(&cache_file);
    if let Some(e) = load_error {
        console.error(&format!("{e}; rebuilding all files"));
    }

    let layout = BuildLayout::new(source_root, resource_root, &config.layout);
    let report = build_all(&layout, &mut store, compiler, console)?;
    store.save(&cache_file)?;
    Ok(RunOutcome::Built(report))
}
