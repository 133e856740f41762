//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::Config;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Load and validate configuration from a YAML file.
///
/// The `CONFIG` environment variable, when set and non-empty, overrides
/// the given path.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let path = match std::env::var("CONFIG") {
        Ok(env_path) if !env_path.is_empty() => PathBuf::from(env_path),
        _ => path.to_path_buf(),
    };

    let content = fs::read_to_string(&path)?;
    let config: Config = serde_yaml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.backends.is_empty() {
        return Err(ConfigError::Validation(
            "no backend servers configured".to_string(),
        ));
    }

    match config.storage.kind.as_str() {
        "memory" | "postgres" => {}
        other => {
            return Err(ConfigError::Validation(format!(
                "unknown storage type: {other}"
            )));
        }
    }

    Ok(())
}
