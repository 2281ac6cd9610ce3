//! Application configuration domain model

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::navigation::TransitionTimings;

/// Application configuration
///
/// Every section is optional in the file; anything missing takes the
/// default below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub heartbeat: HeartbeatConfig,
    pub transition: TransitionConfig,
    pub storage: StorageConfig,
}

/// Backend service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the auth/service API, without trailing slash
    pub base_url: String,
    /// Public API key sent as the `apikey` header; empty means none
    pub api_key: String,
    /// Per-request timeout
    pub request_timeout_ms: u64,
}

/// Liveness probe settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub interval_secs: u64,
}

/// Page transition overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub enter_hold_ms: u64,
    pub leave_hold_ms: u64,
}

/// Local storage settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory when set
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            heartbeat: HeartbeatConfig::default(),
            transition: TransitionConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            request_timeout_ms: 15_000,
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self { interval_secs: 120 }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            enter_hold_ms: 800,
            leave_hold_ms: 900,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document. Unknown keys are ignored.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.request_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat.interval_secs)
    }

    pub fn transition_timings(&self) -> TransitionTimings {
        TransitionTimings {
            enter_hold: Duration::from_millis(self.transition.enter_hold_ms),
            leave_hold: Duration::from_millis(self.transition.leave_hold_ms),
        }
    }
}
