//! Persistent content fingerprints for incremental compilation.
//!
//! The [`FingerprintStore`] maps each source path seen by a build to the
//! digest of the content that last compiled successfully, or to `null` when
//! the last compile failed. It is loaded once at the start of a build and
//! written back once at the end.

#![warn(missing_docs)]

pub mod error;
pub mod hasher;
pub mod store;

pub use error::CacheError;
pub use hasher::SourceHasher;
pub use store::FingerprintStore;
