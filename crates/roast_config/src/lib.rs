//! Parsing and validation of the optional `roast.toml` project configuration.
//!
//! A project without `roast.toml` gets the conventional layout: CoffeeScript
//! sources under `CoffeeSources/`, compiled JavaScript under `Resources/`,
//! the `coffee` compiler, and a `coffee_file_hashes.json` fingerprint document.

#![warn(missing_docs)]

pub mod error;
pub mod layout;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use layout::{check_layout, resolve_cache_dir, resolve_cache_file, LayoutStatus};
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
