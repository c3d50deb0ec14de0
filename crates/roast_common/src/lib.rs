//! Shared foundational types used across the roast build step.
//!
//! Currently this is the content fingerprint used to decide whether a source
//! file changed since the last recorded build.

#![warn(missing_docs)]

pub mod hash;

pub use hash::ContentHash;
