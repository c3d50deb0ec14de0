//! A single tagged console line.

use std::fmt;

use crate::severity::Severity;

/// One status line: a severity and a single-line message.
///
/// Rendered as `<TAG> <message>`. Messages containing line breaks are cut at
/// the first one so that each line stays recognizable by the build console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    /// The severity, which selects the tag.
    pub severity: Severity,
    /// The message text, never containing a line terminator.
    pub message: String,
}

impl LogLine {
    /// Creates a line with the given severity.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if let Some(end) = message.find(['\n', '\r']) {
            message.truncate(end);
        }
        Self { severity, message }
    }

    /// Creates an `[ERROR]` line.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Creates an `[INFO]` line.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Creates a `[DEBUG]` line.
    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.tag(), self.message)
    }
}
