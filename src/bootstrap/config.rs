//! Configuration loader
//!
//! Reads `config.toml` into [`AppConfig`]. Parsing only: defaults for
//! missing keys come from the model itself.

use std::path::{Path, PathBuf};

use anyhow::Context;
use lp_core::AppConfig;
use lp_infra::AppPaths;

pub const CONFIG_PATH_ENV: &str = "LAUNCHPAD_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where the configuration came from, reported once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The path was resolved but nothing is there.
    Missing(PathBuf),
    /// No config location could be determined at all.
    BuiltIn,
}

/// Load configuration from a TOML file.
pub fn load_config(config_path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}

/// `LAUNCHPAD_CONFIG` if set, else the platform config directory.
pub fn resolve_config_path() -> Option<PathBuf> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => AppPaths::default_config_path(),
    }
}

/// Load the configuration, falling back to defaults when no file exists.
///
/// A file that exists but cannot be read or parsed is an error.
pub fn load_or_default() -> anyhow::Result<(AppConfig, ConfigSource)> {
    let Some(path) = resolve_config_path() else {
        return Ok((AppConfig::default(), ConfigSource::BuiltIn));
    };
    if !path.exists() {
        return Ok((AppConfig::default(), ConfigSource::Missing(path)));
    }

    let config = load_config(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok((config, ConfigSource::File(path)))
}
