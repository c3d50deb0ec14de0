//! Walking the source tree and deciding, per file, whether to compile.
//!
//! For every source file the [`Builder`] compares the file's current digest
//! with the one recorded in the [`FingerprintStore`]:
//!
//! | output exists | recorded digest == current | action                |
//! |---------------|----------------------------|-----------------------|
//! | yes           | yes                        | skip                  |
//! | otherwise     |                            | compile               |
//!
//! A successful compile records the current digest. A failed compile records
//! the failure marker and removes the now stale output, so nothing from an
//! older version of the source lingers in the resource tree.

use std::fs;
use std::path::{Path, PathBuf};

use roast_cache::FingerprintStore;
use roast_config::LayoutConfig;
use roast_diagnostics::Console;

use crate::compiler::{CompileResult, Compiler};
use crate::error::BuildError;
use crate::paths::{has_extension, output_file, target_dir, SourceFile};

/// First line printed when a run finds something to look at.
const BANNER: &str = "Compiling CoffeeScript files";

/// Resolved roots and extensions for one walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Root of the source subtree.
    pub source_root: PathBuf,
    /// Root of the resource subtree.
    pub resource_root: PathBuf,
    /// Extension of files to compile, without the dot.
    pub source_extension: String,
    /// Extension of compiler output, without the dot.
    pub output_extension: String,
}

impl BuildLayout {
    /// Combines resolved roots with the extensions from `[layout]`.
    pub fn new(source_root: PathBuf, resource_root: PathBuf, layout: &LayoutConfig) -> Self {
        Self {
            source_root,
            resource_root,
            source_extension: layout.source_extension.clone(),
            output_extension: layout.output_extension.clone(),
        }
    }

    fn is_source(&self, path: &Path) -> bool {
        has_extension(path, &self.source_extension)
    }

    fn output_for(&self, target: &Path, source: &Path) -> PathBuf {
        output_file(target, source, &self.source_extension, &self.output_extension)
    }
}

/// What happened to one source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Output present and digest unchanged; the compiler was not run.
    SkippedUnchanged,
    /// The compiler ran and succeeded.
    Compiled,
    /// The compiler ran and failed, or the source could not be read.
    Failed,
}

/// Per-file entry of a [`BuildReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The source file.
    pub source: PathBuf,
    /// Where its output belongs.
    pub output: PathBuf,
    /// The decision taken.
    pub outcome: BuildOutcome,
}

/// Outcome of a full walk, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// One entry per source file found.
    pub files: Vec<FileReport>,
}

impl BuildReport {
    fn count(&self, outcome: BuildOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }

    /// Number of files compiled successfully.
    pub fn compiled(&self) -> usize {
        self.count(BuildOutcome::Compiled)
    }

    /// Number of files skipped as unchanged.
    pub fn skipped(&self) -> usize {
        self.count(BuildOutcome::SkippedUnchanged)
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.count(BuildOutcome::Failed)
    }

    /// Number of compiler invocations attempted.
    pub fn invocations(&self) -> usize {
        self.files.len() - self.skipped()
    }

    /// Returns the outcome recorded for `source`, if it was walked.
    pub fn outcome_of(&self, source: &Path) -> Option<BuildOutcome> {
        self.files
            .iter()
            .find(|f| f.source == source)
            .map(|f| f.outcome)
    }
}

/// Single-threaded orchestrator for one build run.
///
/// Borrows the fingerprint store mutably for the duration of the walk; the
/// caller persists it afterwards.
pub struct Builder<'a> {
    layout: &'a BuildLayout,
    store: &'a mut FingerprintStore,
    compiler: &'a dyn Compiler,
    console: &'a dyn Console,
    banner_shown: bool,
    report: BuildReport,
}

impl<'a> Builder<'a> {
    /// Creates a builder for one run.
    pub fn new(
        layout: &'a BuildLayout,
        store: &'a mut FingerprintStore,
        compiler: &'a dyn Compiler,
        console: &'a dyn Console,
    ) -> Self {
        Self {
            layout,
            store,
            compiler,
            console,
            banner_shown: false,
            report: BuildReport::default(),
        }
    }

    /// Walks the whole source tree and returns what happened to each file.
    ///
    /// Compile failures are recorded and do not stop the walk. Only errors
    /// reading the tree itself are returned.
    pub fn run(mut self) -> Result<BuildReport, BuildError> {
        let root = self.layout.source_root.clone();
        let target = self.target_for(&root)?;
        self.walk_dir(&root, &target)?;
        Ok(self.report)
    }

    fn target_for(&self, dir: &Path) -> Result<PathBuf, BuildError> {
        target_dir(&self.layout.source_root, &self.layout.resource_root, dir).ok_or_else(|| {
            BuildError::OutsideSourceRoot {
                path: dir.to_path_buf(),
                source_root: self.layout.source_root.clone(),
            }
        })
    }

    /// Processes the files of `dir` in name order, then descends.
    ///
    /// Symlinked directories are not followed.
    fn walk_dir(&mut self, dir: &Path, target: &Path) -> Result<(), BuildError> {
        let io_err = |source| BuildError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = fs::read_dir(dir)
            .map_err(io_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        entries.sort_by_key(|e| e.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|source| BuildError::Io {
                path: path.clone(),
                source,
            })?;
            if file_type.is_dir() {
                subdirs.push(path);
            } else if self.layout.is_source(&path) && path.is_file() {
                self.process_file(&path, target);
            }
        }

        for subdir in subdirs {
            let sub_target = self.target_for(&subdir)?;
            self.walk_dir(&subdir, &sub_target)?;
        }
        Ok(())
    }

    fn process_file(&mut self, path: &Path, target: &Path) {
        self.announce(path);

        let output = self.layout.output_for(target, path);
        let outcome = match SourceFile::load(path, target, output.clone()) {
            Ok(file) => self.build_file(&file),
            Err(e) => {
                self.console.error(&e.to_string());
                self.fail(path, &output);
                BuildOutcome::Failed
            }
        };

        self.report.files.push(FileReport {
            source: path.to_path_buf(),
            output,
            outcome,
        });
    }

    fn build_file(&mut self, file: &SourceFile) -> BuildOutcome {
        if file.output_path.exists() && self.store.is_current(&file.path, &file.digest) {
            return BuildOutcome::SkippedUnchanged;
        }

        self.console
            .debug(&format!("Compiling {}", file.path.display()));
        match self.compiler.compile(&file.path, &file.target_dir) {
            CompileResult::Success => {
                self.store.record_success(&file.path, &file.digest);
                BuildOutcome::Compiled
            }
            CompileResult::Failure { diagnostic } => {
                self.console.error(&diagnostic);
                self.fail(&file.path, &file.output_path);
                BuildOutcome::Failed
            }
        }
    }

    /// Marks `source` as failed and removes its stale output, if any.
    fn fail(&mut self, source: &Path, output: &Path) {
        self.store.record_failure(source);
        match fs::remove_file(output) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => self.console.error(&format!(
                "could not remove stale output {}: {e}",
                output.display()
            )),
        }
    }

    fn announce(&mut self, path: &Path) {
        if !self.banner_shown {
            self.console.info(BANNER);
            self.banner_shown = true;
        }
        let name = path.file_name().unwrap_or(path.as_os_str());
        self.console.info(&format!("\t{}", name.to_string_lossy()));
    }
}

/// Walks the source tree once, compiling what changed.
///
/// Convenience wrapper around [`Builder`].
pub fn build_all(
    layout: &BuildLayout,
    store: &mut FingerprintStore,
    compiler: &dyn Compiler,
    console: &dyn Console,
) -> Result<BuildReport, BuildError> {
    Builder::new(layout, store, compiler, console).run()
}
