//! roast CLI: compile a project's CoffeeScript sources into its resources.
//!
//! `roast [PROJECT_DIR]` compiles every changed `.coffee` file under
//! `CoffeeSources/` into `Resources/`, skipping files whose content and
//! output are unchanged since the last run.

#![warn(missing_docs)]

mod compile;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use roast_diagnostics::LogLine;

/// roast — incremental CoffeeScript compilation for a project build.
#[derive(Parser, Debug)]
#[command(name = "roast", version, about = "Incremental CoffeeScript build step")]
pub struct Cli {
    /// Project directory containing `CoffeeSources/` and `Resources/`.
    /// Defaults to the current directory.
    pub project_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match compile::run(cli.project_dir) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", LogLine::error(e.to_string()));
            process::exit(1);
        }
    }
}
