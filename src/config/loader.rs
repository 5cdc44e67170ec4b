//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::SiteConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load the effective configuration.
///
/// Reads the TOML file when one is given (defaults otherwise), overlays the
/// process environment, then validates the result.
pub fn load_config(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => SiteConfig::default(),
    };
    config.apply_env();

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
