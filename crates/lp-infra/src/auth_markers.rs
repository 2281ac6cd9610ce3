//! File-based auth marker store
//!
//! Persists the remember-me marker as a small JSON file in the application
//! data directory.

use async_trait::async_trait;
use lp_core::ports::{AuthMarker, AuthMarkerStorePort};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const DEFAULT_AUTH_MARKER_FILE: &str = ".auth_marker";

pub struct FileAuthMarkerStore {
    marker_file_path: PathBuf,
}

impl FileAuthMarkerStore {
    pub fn new(marker_file_path: PathBuf) -> Self {
        Self { marker_file_path }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self {
            marker_file_path: base_dir.join(DEFAULT_AUTH_MARKER_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.marker_file_path
    }

    async fn ensure_parent_dir(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.marker_file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AuthMarkerStorePort for FileAuthMarkerStore {
    async fn load(&self) -> anyhow::Result<Option<AuthMarker>> {
        if !self.marker_file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.marker_file_path).await?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let marker: AuthMarker = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse auth marker: {}", e))?;
        Ok(Some(marker))
    }

    async fn save(&self, marker: &AuthMarker) -> anyhow::Result<()> {
        self.ensure_parent_dir().await?;

        let json = serde_json::to_string_pretty(marker)
            .map_err(|e| anyhow::anyhow!("Failed to serialize auth marker: {}", e))?;

        let mut file = fs::File::create(&self.marker_file_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create auth marker file: {}", e))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write auth marker file: {}", e))?;
        file.sync_all()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to sync auth marker file: {}", e))?;

        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        if self.marker_file_path.exists() {
            fs::remove_file(&self.marker_file_path).await?;
        }
        Ok(())
    }
}
