//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::RoastConfig;
use std::path::Path;

/// File name of the optional project configuration.
pub const CONFIG_FILE: &str = "roast.toml";

/// Loads and validates `roast.toml` from a project directory.
///
/// A missing file yields the default configuration; any other read failure
/// is an error.
pub fn load_config(project_dir: &Path) -> Result<RoastConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    match std::fs::read_to_string(&config_path) {
        Ok(content) => load_config_from_str(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RoastConfig::default()),
        Err(e) => Err(e.into()),
    }
}

/// Parses and validates a `roast.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<RoastConfig, ConfigError> {
    let config: RoastConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects values that would make the walk or the path mapping meaningless.
fn validate_config(config: &RoastConfig) -> Result<(), ConfigError> {
    let layout = &config.layout;
    for (field, value) in [
        ("layout.sources", &layout.sources),
        ("layout.resources", &layout.resources),
        ("layout.source_extension", &layout.source_extension),
        ("layout.output_extension", &layout.output_extension),
        ("compiler.program", &config.compiler.program),
        ("cache.file", &config.cache.file),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!("{field} is empty")));
        }
    }
    for (field, ext) in [
        ("layout.source_extension", &layout.source_extension),
        ("layout.output_extension", &layout.output_extension),
    ] {
        if ext.contains('.') || ext.contains('/') {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be a bare extension, got `{ext}`"
            )));
        }
    }
    if layout.source_extension == layout.output_extension {
        return Err(ConfigError::ValidationError(
            "layout.source_extension and layout.output_extension must differ".to_string(),
        ));
    }
    if Path::new(&layout.sources) == Path::new(&layout.resources) {
        return Err(ConfigError::ValidationError(
            "layout.sources and layout.resources must differ".to_string(),
        ));
    }
    if config.compiler.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "compiler.timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, RoastConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[layout]
sources = "src/coffee"
resources = "www/js"
source_extension = "litcoffee"
output_extension = "js"

[compiler]
program = "/usr/local/bin/coffee"
args = ["--bare", "--compile", "--no-header"]
timeout_secs = 120

[cache]
dir = ".roast"
file = "hashes.json"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.layout.sources, "src/coffee");
        assert_eq!(config.layout.resources, "www/js");
        assert_eq!(config.layout.source_extension, "litcoffee");
        assert_eq!(config.compiler.program, "/usr/local/bin/coffee");
        assert_eq!(config.compiler.args.len(), 3);
        assert_eq!(config.compiler.timeout_secs, Some(120));
        assert_eq!(config.cache.dir.as_deref(), Some(".roast"));
        assert_eq!(config.cache.file, "hashes.json");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[compiler]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(config.compiler.program, "coffee");
        assert_eq!(config.compiler.args, vec!["-b", "-c"]);
        assert_eq!(config.compiler.timeout_secs, Some(5));
        assert_eq!(config.layout.sources, "CoffeeSources");
    }

    #[test]
    fn unknown_key_errors() {
        let err = load_config_from_str("[layout]\nsourcez = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_sources_errors() {
        let err = load_config_from_str("[layout]\nsources = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn dotted_extension_errors() {
        let err = load_config_from_str("[layout]\nsource_extension = \".coffee\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn same_extensions_error() {
        let err = load_config_from_str("[layout]\noutput_extension = \"coffee\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn same_subtrees_error() {
        let err = load_config_from_str("[layout]\nresources = \"CoffeeSources\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_timeout_errors() {
        let err = load_config_from_str("[compiler]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, RoastConfig::default());
    }

    #[test]
    fn reads_file_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[cache]\nfile = \"h.json\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.cache.file, "h.json");
    }
}
