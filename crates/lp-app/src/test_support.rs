//! Port fakes shared by the controller unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lp_core::ports::{AuthMarker, AuthMarkerStorePort, BackendClientPort, ClockPort, ViewportPort};
use lp_core::{BackendError, Credentials, OAuthProvider, SignupRequest, User, UserId};
use tokio::sync::{oneshot, Notify};

mockall::mock! {
    pub Backend {}

    #[async_trait]
    impl BackendClientPort for Backend {
        async fn resolve_current_user(&self) -> Result<Option<User>, BackendError>;
        async fn login(&self, credentials: &Credentials) -> Result<User, BackendError>;
        async fn signup(&self, request: &SignupRequest) -> Result<User, BackendError>;
        async fn create_demo_user(&self) -> Result<User, BackendError>;
        async fn logout(&self) -> Result<(), BackendError>;
        async fn check_health(&self) -> Result<bool, BackendError>;
        async fn login_with_oauth_provider(
            &self,
            provider: &OAuthProvider,
        ) -> Result<(), BackendError>;
    }
}

pub fn user(id: &str, onboarding_completed: bool) -> User {
    User {
        id: UserId::from(id),
        email: format!("{id}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        onboarding_completed,
        is_demo: false,
    }
}

type ResolveResult = Result<Option<User>, BackendError>;

/// Scriptable backend.
///
/// Resolution either answers immediately with `resolve_result` or, when gated,
/// parks each call until the test releases it through [`FakeBackend::release`].
pub struct FakeBackend {
    pub resolve_result: Mutex<ResolveResult>,
    pub login_result: Mutex<Result<User, BackendError>>,
    pub demo_result: Mutex<Result<User, BackendError>>,
    pub logout_result: Mutex<Result<(), BackendError>>,
    pub health_result: Mutex<Result<bool, BackendError>>,
    pub resolve_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub health_calls: AtomicUsize,
    gated: Mutex<Option<VecDeque<oneshot::Sender<ResolveResult>>>>,
    parked: Notify,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            resolve_result: Mutex::new(Ok(None)),
            login_result: Mutex::new(Err(BackendError::Network("unset".into()))),
            demo_result: Mutex::new(Err(BackendError::Network("unset".into()))),
            logout_result: Mutex::new(Ok(())),
            health_result: Mutex::new(Ok(true)),
            resolve_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            health_calls: AtomicUsize::new(0),
            gated: Mutex::new(None),
            parked: Notify::new(),
        }
    }

    pub fn with_session(user: Option<User>) -> Self {
        let backend = Self::new();
        *backend.resolve_result.lock().unwrap() = Ok(user);
        backend
    }

    pub fn gate_resolution(&self) {
        *self.gated.lock().unwrap() = Some(VecDeque::new());
    }

    /// Wait until `count` resolution calls are parked.
    pub async fn wait_parked(&self, count: usize) {
        loop {
            let notified = self.parked.notified();
            if self.parked_count() >= count {
                return;
            }
            notified.await;
        }
    }

    fn parked_count(&self) -> usize {
        self.gated.lock().unwrap().as_ref().map_or(0, VecDeque::len)
    }

    /// Complete the parked call at `index` (in call order).
    pub fn release(&self, index: usize, result: ResolveResult) {
        let sender = {
            let mut gated = self.gated.lock().unwrap();
            let queue = gated.as_mut().expect("resolution is not gated");
            std::mem::replace(&mut queue[index], oneshot::channel().0)
        };
        let _ = sender.send(result);
    }

    pub fn set_health(&self, result: Result<bool, BackendError>) {
        *self.health_result.lock().unwrap() = result;
    }
}

#[async_trait]
impl BackendClientPort for FakeBackend {
    async fn resolve_current_user(&self) -> Result<Option<User>, BackendError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let parked = {
            let mut gated = self.gated.lock().unwrap();
            gated.as_mut().map(|queue| {
                let (tx, rx) = oneshot::channel();
                queue.push_back(tx);
                rx
            })
        };
        match parked {
            Some(rx) => {
                self.parked.notify_waiters();
                rx.await
                    .unwrap_or_else(|_| Err(BackendError::Network("dropped".into())))
            }
            None => self.resolve_result.lock().unwrap().clone(),
        }
    }

    async fn login(&self, _credentials: &Credentials) -> Result<User, BackendError> {
        self.login_result.lock().unwrap().clone()
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<User, BackendError> {
        self.login_result.lock().unwrap().clone()
    }

    async fn create_demo_user(&self) -> Result<User, BackendError> {
        self.demo_result.lock().unwrap().clone()
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.logout_result.lock().unwrap().clone()
    }

    async fn check_health(&self) -> Result<bool, BackendError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.health_result.lock().unwrap().clone()
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
    pub clear_calls: AtomicUsize,
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
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        *self.marker.lock().unwrap() = None;
        Ok(())
    }
}

pub struct FixedClock(pub i64);

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

#[derive(Default)]
pub struct RecordingViewport {
    pub resets: AtomicUsize,
}

impl ViewportPort for RecordingViewport {
    fn reset_scroll(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}
