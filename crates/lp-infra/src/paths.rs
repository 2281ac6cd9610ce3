//! Application directories.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "launchpad";

fn resolved_app_dir_name() -> String {
    match std::env::var("LAUNCHPAD_PROFILE") {
        Ok(profile) if !profile.is_empty() => format!("{APP_DIR_NAME}-{profile}"),
        _ => APP_DIR_NAME.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub auth_marker_path: PathBuf,
}

impl AppPaths {
    pub fn from_data_dir(data_dir: PathBuf) -> Self {
        Self {
            logs_dir: data_dir.join("logs"),
            auth_marker_path: data_dir.join(crate::auth_markers::DEFAULT_AUTH_MARKER_FILE),
            data_dir,
        }
    }

    /// Resolve against the platform data directory unless `data_dir` is given.
    pub fn resolve(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("local data directory is unavailable"))?
                .join(resolved_app_dir_name()),
        };
        Ok(Self::from_data_dir(data_dir))
    }

    /// Default location of `config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(resolved_app_dir_name()).join("config.toml"))
    }
}
