//! File-based configuration loading

use std::fs;
use std::path::Path;

use super::registry_config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};

/// Load registry configuration from a file
///
/// Supports TOML and JSON formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> RegistryResult<RegistryConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No registry config file, using defaults");
        return Ok(RegistryConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        RegistryError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config: RegistryConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            RegistryError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            RegistryError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
    };

    config.validate().map_err(|e| match e {
        RegistryError::Config { message, context } => RegistryError::config_with_context(
            message,
            format!(
                "{} in '{}'",
                context.unwrap_or_else(|| "Validating configuration".to_string()),
                path.display()
            ),
        ),
        other => other,
    })?;

    tracing::info!(
        path = %path.display(),
        overrides = config.overrides.len(),
        "Loaded registry configuration"
    );
    Ok(config)
}
