//! Connectivity model.

use serde::Serialize;

use crate::user::User;

/// Reachability as last reported by the platform and the liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectivityState {
    pub online: bool,
    /// Result of the most recent liveness probe.
    pub healthy: bool,
}

impl ConnectivityState {
    pub fn new(online: bool) -> Self {
        Self {
            online,
            healthy: true,
        }
    }

    pub fn indicator(&self, user: Option<&User>) -> ConnectivityIndicator {
        if !self.online {
            ConnectivityIndicator::Offline
        } else if !self.healthy {
            ConnectivityIndicator::Degraded
        } else if user.is_some_and(|user| user.is_demo) {
            ConnectivityIndicator::Demo
        } else {
            ConnectivityIndicator::Online
        }
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Ambient badge shown by the shell. Never blocks interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityIndicator {
    Online,
    Offline,
    Degraded,
    Demo,
}
