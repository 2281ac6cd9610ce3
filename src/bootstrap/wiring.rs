//! Dependency wiring
//!
//! Builds the concrete adapters from configuration and hands them to the
//! shell. This is the only place that knows which adapter backs which port.

use std::sync::Arc;

use anyhow::Context;
use lp_app::{AppShell, AppShellDeps, ShellSettings};
use lp_core::AppConfig;
use lp_infra::{
    AppPaths, AuthEventHub, ChannelPlatformSignals, FileAuthMarkerStore, HeadlessViewport,
    HttpBackendClient, SystemClock,
};
use tracing::info;

/// Everything the driver needs after wiring.
pub struct Wired {
    pub shell: Arc<AppShell>,
    pub signals: ChannelPlatformSignals,
    pub backend: Arc<HttpBackendClient>,
    pub paths: AppPaths,
}

pub fn wire_shell(config: &AppConfig, paths: AppPaths) -> anyhow::Result<Wired> {
    let hub = AuthEventHub::new();
    let backend = Arc::new(
        HttpBackendClient::new(&config.backend, hub.clone())
            .context("Failed to create backend client")?,
    );
    let signals = ChannelPlatformSignals::new(true);
    let markers = Arc::new(FileAuthMarkerStore::new(paths.auth_marker_path.clone()));

    let deps = AppShellDeps {
        backend: backend.clone(),
        auth_events: Arc::new(hub),
        markers,
        clock: Arc::new(SystemClock),
        reachability: Arc::new(signals.clone()),
        platform: Arc::new(signals.clone()),
        viewport: Arc::new(HeadlessViewport::new()),
    };
    let shell = Arc::new(AppShell::new(deps, ShellSettings::from_config(config)));

    info!(
        backend = %config.backend.base_url,
        data_dir = %paths.data_dir.display(),
        "shell wired"
    );

    Ok(Wired {
        shell,
        signals,
        backend,
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lp_core::{ConnectivityIndicator, Page};
    use std::time::Duration;

    #[tokio::test]
    async fn wired_shell_starts_anonymous_without_network() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.backend.base_url = "http://127.0.0.1:9".to_string();

        let wired = wire_shell(&config, AppPaths::from_data_dir(temp_dir.path().to_path_buf()))
            .unwrap();

        assert_eq!(wired.shell.start().await, None);
        assert_eq!(wired.shell.view().page, Page::Home);
        wired.shell.shutdown();
    }

    #[tokio::test]
    async fn demo_indicator_survives_sign_in_echo() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/functions/v1/create-demo-user")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "access_token": "demo-token",
                    "user": {
                        "id": "demo-1",
                        "user_metadata": { "first_name": "Demo", "onboarding_completed": true }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;
        let lookup = server
            .mock("GET", "/auth/v1/user")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "id": "demo-1",
                    "user_metadata": { "first_name": "Demo", "onboarding_completed": true }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.backend.base_url = server.url();
        let wired = wire_shell(&config, AppPaths::from_data_dir(temp_dir.path().to_path_buf()))
            .unwrap();
        wired.shell.start().await;

        let user = wired.shell.login_as_demo().await.unwrap();
        assert!(user.is_demo);

        // Wait for the SignedIn echo to re-resolve through the user endpoint.
        for _ in 0..200 {
            if lookup.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(lookup.matched_async().await);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let view = wired.shell.view();
        assert_eq!(view.user.map(|user| user.is_demo), Some(true));
        assert_eq!(view.indicator, ConnectivityIndicator::Demo);
        wired.shell.shutdown();
    }

    #[test]
    fn empty_base_url_fails_wiring() {
        let mut config = AppConfig::default();
        config.backend.base_url = String::new();

        let result = wire_shell(&config, AppPaths::from_data_dir("/tmp/launchpad".into()));
        assert!(result.is_err());
    }
}
