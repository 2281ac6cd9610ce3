//! Client-side auth marker port
//!
//! Markers remember that this device asked to stay signed in. They are
//! written on a remembered login and cleared on every sign-out path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMarker {
    pub user_id: UserId,
    pub remember: bool,
    pub stored_at_ms: i64,
}

#[async_trait]
pub trait AuthMarkerStorePort: Send + Sync {
    async fn load(&self) -> anyhow::Result<Option<AuthMarker>>;

    /// Overwrites any existing marker.
    async fn save(&self, marker: &AuthMarker) -> anyhow::Result<()>;

    /// Idempotent: clearing an empty store succeeds.
    async fn clear(&self) -> anyhow::Result<()>;
}
