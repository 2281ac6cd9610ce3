//! Shared harness for the shell integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lp_app::{AppShell, AppShellDeps, ShellSettings};
use lp_core::ports::{AuthMarker, AuthMarkerStorePort, BackendClientPort};
use lp_core::{BackendError, Credentials, OAuthProvider, SignupRequest, User, UserId};
use lp_infra::{AuthEventHub, ChannelPlatformSignals, HeadlessViewport, SystemClock};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn user(id: &str, onboarding_completed: bool) -> User {
    User {
        id: UserId::from(id),
        email: format!("{id}@example.com"),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        onboarding_completed,
        is_demo: false,
    }
}

pub fn credentials(remember: bool) -> Credentials {
    Credentials {
        email: "grace@example.com".to_string(),
        password: "correct horse".to_string(),
        remember,
    }
}

/// Backend whose answers are set per test.
pub struct ScriptedBackend {
    pub session: Mutex<Result<Option<User>, BackendError>>,
    pub login: Mutex<Result<User, BackendError>>,
    pub demo: Mutex<Result<User, BackendError>>,
    pub logout: Mutex<Result<(), BackendError>>,
    pub health: Mutex<Result<bool, BackendError>>,
    pub resolve_calls: AtomicUsize,
    pub health_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(Ok(None)),
            login: Mutex::new(Err(BackendError::rejected(
                400,
                Some("invalid_credentials"),
                "Invalid login credentials",
            ))),
            demo: Mutex::new(Err(BackendError::Network("demo unavailable".into()))),
            logout: Mutex::new(Ok(())),
            health: Mutex::new(Ok(true)),
            resolve_calls: AtomicUsize::new(0),
            health_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    pub fn signed_in_as(user: User) -> Self {
        let backend = Self::new();
        *backend.session.lock().unwrap() = Ok(Some(user));
        backend
    }

    pub fn resolves(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendClientPort for ScriptedBackend {
    async fn resolve_current_user(&self) -> Result<Option<User>, BackendError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.session.lock().unwrap().clone()
    }

    async fn login(&self, _credentials: &Credentials) -> Result<User, BackendError> {
        self.login.lock().unwrap().clone()
    }

    async fn signup(&self, request: &SignupRequest) -> Result<User, BackendError> {
        let mut user = user("new-founder", false);
        user.email = request.email.clone();
        Ok(user)
    }

    async fn create_demo_user(&self) -> Result<User, BackendError> {
        self.demo.lock().unwrap().clone()
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.logout.lock().unwrap().clone()
    }

    async fn check_health(&self) -> Result<bool, BackendError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.health.lock().unwrap().clone()
    }

    async fn login_with_oauth_provider(
        &self,
        _provider: &OAuthProvider,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMarkers {
    pub marker: Mutex<Option<AuthMarker>>,
}

#[async_trait]
impl AuthMarkerStorePort for MemoryMarkers {
    async fn load(&self) -> anyhow::Result<Option<AuthMarker>> {
        Ok(self.marker.lock().unwrap().clone())
    }

    async fn save(&self, marker: &AuthMarker) -> anyhow::Result<()> {
        *self.marker.lock().unwrap() = Some(marker.clone());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.marker.lock().unwrap() = None;
        Ok(())
    }
}

pub struct Harness {
    pub shell: AppShell,
    pub backend: Arc<ScriptedBackend>,
    pub hub: AuthEventHub,
    pub signals: ChannelPlatformSignals,
    pub markers: Arc<MemoryMarkers>,
    pub viewport: Arc<HeadlessViewport>,
}

impl Harness {
    pub fn new(backend: ScriptedBackend, online: bool) -> Self {
        init_tracing();
        let backend = Arc::new(backend);
        let hub = AuthEventHub::new();
        let signals = ChannelPlatformSignals::new(online);
        let markers = Arc::new(MemoryMarkers::default());
        let viewport = Arc::new(HeadlessViewport::new());

        let shell = AppShell::new(
            AppShellDeps {
                backend: backend.clone(),
                auth_events: Arc::new(hub.clone()),
                markers: markers.clone(),
                clock: Arc::new(SystemClock),
                reachability: Arc::new(signals.clone()),
                platform: Arc::new(signals.clone()),
                viewport: viewport.clone(),
            },
            ShellSettings::default(),
        );

        Self {
            shell,
            backend,
            hub,
            signals,
            markers,
            viewport,
        }
    }
}
