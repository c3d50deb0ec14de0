//! The default (and only) command: build one project directory.

use std::path::{Path, PathBuf};

use roast_build::{BuildError, RunOutcome};
use roast_diagnostics::{LogLine, TerminalConsole};

/// Runs the build for `project_dir` (or the current directory).
///
/// Returns the process exit code. Individual compile failures are reported
/// on the console but still exit 0; only a broken project layout or a fatal
/// error exits non-zero.
pub fn run(project_dir: Option<PathBuf>) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_dir(project_dir)?;
    let config = roast_config::load_config(&project_dir)?;
    let console = TerminalConsole::new();

    match roast_build::run(&project_dir, &config, &console) {
        Ok(RunOutcome::NothingToDo { source_root }) => {
            println!("{} does not exist. Skipping compile.", source_root.display());
            Ok(0)
        }
        Ok(RunOutcome::Built(_)) => Ok(0),
        Err(e @ BuildError::MissingResources { .. }) => {
            eprintln!("{}", LogLine::error(e.to_string()));
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

/// Makes the project directory absolute so fingerprint keys do not depend
/// on how the directory was named on the command line.
fn resolve_project_dir(project_dir: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = match project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    canonical(&dir)
}

fn canonical(dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::canonicalize(dir).map_err(|e| {
        Box::<dyn std::error::Error>::from(format!(
            "cannot open project directory {}: {e}",
            dir.display()
        ))
    })
}
