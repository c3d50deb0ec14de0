//! Severity levels and their console tags.

use std::fmt;

/// The severity of a console line.
///
/// Ordered from least severe (`Debug`) to most severe (`Error`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Severity {
    /// Trace output, e.g. the per-file `Compiling <path>` line.
    Debug,
    /// Progress information.
    Info,
    /// A failure the user has to act on.
    Error,
}

impl Severity {
    /// Returns the bracketed tag that prefixes lines of this severity.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Debug => "[DEBUG]",
            Severity::Info => "[INFO]",
            Severity::Error => "[ERROR]",
        }
    }

    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
