//! Console backends that receive tagged lines.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::line::LogLine;
use crate::severity::Severity;

/// Destination for status lines.
///
/// The build pipeline only ever talks to a `&dyn Console`, so callers decide
/// whether lines go to a terminal, into memory, or somewhere else.
pub trait Console {
    /// Emits one line.
    fn emit(&self, line: LogLine);

    /// Emits an `[ERROR]` line.
    fn error(&self, message: &str) {
        self.emit(LogLine::error(message));
    }

    /// Emits an `[INFO]` line.
    fn info(&self, message: &str) {
        self.emit(LogLine::info(message));
    }

    /// Emits a `[DEBUG]` line.
    fn debug(&self, message: &str) {
        self.emit(LogLine::debug(message));
    }
}

/// Prints lines to standard output, where the host build console reads them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConsole;

impl TerminalConsole {
    /// Creates a console that prints every line.
    pub fn new() -> Self {
        Self
    }
}

impl Console for TerminalConsole {
    fn emit(&self, line: LogLine) {
        // A closed stdout must not abort the build.
        let _ = writeln!(std::io::stdout().lock(), "{line}");
    }
}

/// Records lines in memory instead of printing them.
///
/// The error count is tracked atomically so `has_errors` does not need the
/// lock.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<LogLine>>,
    error_count: AtomicUsize,
}

impl MemoryConsole {
    /// Creates an empty console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any `[ERROR]` line has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of `[ERROR]` lines emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all recorded lines.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the recorded lines of one severity, as message text.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.severity == severity)
            .map(|l| l.message)
            .collect()
    }

    /// Renders the full transcript, one tagged line per row.
    pub fn transcript(&self) -> String {
        self.lines()
            .iter()
            .map(|l| format!("{l}\n"))
            .collect()
    }
}

impl Console for MemoryConsole {
    fn emit(&self, line: LogLine) {
        if line.severity.is_error() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line);
    }
}
