//! Tagged status lines for the surrounding build console.
//!
//! Every message roast prints is a single [`LogLine`] of the form
//! `<TAG> <message>`, where the tag is one of `[ERROR]`, `[INFO]` or `[DEBUG]`.
//! The host build UI recognizes these prefixes, so the format is a contract.
//! Lines are emitted through a [`Console`]: [`TerminalConsole`] prints them,
//! [`MemoryConsole`] records them.

#![warn(missing_docs)]

pub mod console;
pub mod line;
pub mod severity;

pub use console::{Console, MemoryConsole, TerminalConsole};
pub use line::LogLine;
pub use severity::Severity;
