//! Session controller.
//!
//! Single owner of "who is logged in". Every write to the current user goes
//! through this type; everybody else reads or subscribes.

use std::sync::{Arc, Mutex};

use lp_core::ports::{AuthMarker, AuthMarkerStorePort, BackendClientPort, ClockPort};
use lp_core::session::{AuthEvent, AuthSession, ResolveReason};
use lp_core::{AuthFailure, Credentials, OAuthProvider, SignupRequest, User};
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::sync_bus::SyncBus;

pub struct SessionController {
    backend: Arc<dyn BackendClientPort>,
    markers: Arc<dyn AuthMarkerStorePort>,
    clock: Arc<dyn ClockPort>,
    sync_bus: Arc<SyncBus>,
    user_tx: watch::Sender<Option<User>>,
    /// Bumped by every authoritative identity change (login, logout,
    /// signed-out). Resolutions started under an older epoch are discarded.
    /// Held while committing so check and write are one step.
    identity_epoch: Mutex<u64>,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn BackendClientPort>,
        markers: Arc<dyn AuthMarkerStorePort>,
        clock: Arc<dyn ClockPort>,
        sync_bus: Arc<SyncBus>,
    ) -> Self {
        let (user_tx, _rx) = watch::channel(None);
        Self {
            backend,
            markers,
            clock,
            sync_bus,
            user_tx,
            identity_epoch: Mutex::new(0),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user_tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_tx.borrow().is_some()
    }

    pub fn subscribe_user(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    /// Ask the backend for the persisted identity.
    ///
    /// Never fails. A startup failure means "no user"; a refresh failure keeps
    /// whatever user is already known. An explicit "no session" answer always
    /// clears the user.
    pub async fn resolve_session(&self, reason: ResolveReason) -> Option<User> {
        let started_epoch = self.epoch();
        let span = info_span!("session.resolve", ?reason);
        async {
            match self.backend.resolve_current_user().await {
                Ok(user) => {
                    let committed = self.commit_resolution(started_epoch, user.clone());
                    debug!(
                        authenticated = user.is_some(),
                        committed, "session resolved"
                    );
                    user
                }
                Err(err) if reason.is_refresh() => {
                    warn!(error = %err, "session refresh failed, keeping known user");
                    None
                }
                Err(err) => {
                    warn!(error = %err, "startup session resolution failed, continuing anonymous");
                    self.commit_resolution(started_epoch, None);
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Edge from the auth-event stream.
    pub async fn on_auth_event(&self, event: AuthEvent, session: Option<AuthSession>) {
        debug!(?event, has_session = session.is_some(), "auth event received");
        match event {
            AuthEvent::SignedIn | AuthEvent::TokenRefreshed => {
                self.resolve_session(ResolveReason::AuthEvent).await;
                self.sync_bus.bump();
            }
            AuthEvent::SignedOut => {
                if self.set_identity(None).is_none() {
                    debug!("sign-out echo with no active user");
                    return;
                }
                info!("auth stream reported sign-out");
                self.clear_markers().await;
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthFailure> {
        let span = info_span!("session.login", email = %credentials.email);
        async {
            let user = self
                .backend
                .login(credentials)
                .await
                .map_err(|err| self.classify("login", err))?;
            self.set_identity(Some(user.clone()));
            if credentials.remember {
                self.store_marker(&user).await;
            }
            info!(user_id = %user.id, "logged in");
            Ok(user)
        }
        .instrument(span)
        .await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<User, AuthFailure> {
        let span = info_span!("session.signup", email = %request.email);
        async {
            let user = self
                .backend
                .signup(request)
                .await
                .map_err(|err| self.classify("signup", err))?;
            self.set_identity(Some(user.clone()));
            info!(user_id = %user.id, "signed up");
            Ok(user)
        }
        .instrument(span)
        .await
    }

    pub async fn login_as_demo(&self) -> Result<User, AuthFailure> {
        let span = info_span!("session.login_as_demo");
        async {
            let user = self
                .backend
                .create_demo_user()
                .await
                .map_err(|err| self.classify("demo login", err))?;
            self.set_identity(Some(user.clone()));
            info!(user_id = %user.id, "demo session started");
            Ok(user)
        }
        .instrument(span)
        .await
    }

    /// Start a redirect-based login; the user arrives through the auth stream.
    pub async fn login_with_oauth(&self, provider: &OAuthProvider) -> Result<(), AuthFailure> {
        self.backend
            .login_with_oauth_provider(provider)
            .await
            .map_err(|err| self.classify("oauth login", err))?;
        info!(%provider, "oauth login started");
        Ok(())
    }

    /// Sign out. Local state is cleared whatever the backend answers.
    pub async fn logout(&self) {
        let span = info_span!("session.logout");
        async {
            if let Err(err) = self.backend.logout().await {
                warn!(error = %err, "backend sign-out failed, clearing local session anyway");
            }
            self.set_identity(None);
            self.clear_markers().await;
            info!("logged out");
        }
        .instrument(span)
        .await
    }

    /// Apply a fresher backend copy of the signed-in user.
    ///
    /// Ignored when nobody is signed in or the copy belongs to someone else.
    pub fn replace_user(&self, user: User) -> bool {
        let _epoch = self.lock_epoch();
        self.user_tx.send_if_modified(|current| match current {
            Some(existing) if existing.id == user.id => {
                let changed = *existing != user;
                *existing = user;
                changed
            }
            _ => {
                debug!(user_id = %user.id, "ignoring profile update for inactive user");
                false
            }
        })
    }

    fn epoch(&self) -> u64 {
        *self.lock_epoch()
    }

    fn lock_epoch(&self) -> std::sync::MutexGuard<'_, u64> {
        self.identity_epoch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the user that was active before.
    fn set_identity(&self, user: Option<User>) -> Option<User> {
        let mut epoch = self.lock_epoch();
        *epoch += 1;
        self.user_tx.send_replace(user)
    }

    fn commit_resolution(&self, started_epoch: u64, user: Option<User>) -> bool {
        let epoch = self.lock_epoch();
        if *epoch != started_epoch {
            debug!(
                started_epoch,
                current_epoch = *epoch,
                "discarding resolution superseded by an identity change"
            );
            return false;
        }
        self.user_tx.send_replace(user);
        true
    }

    fn classify(&self, operation: &'static str, err: lp_core::BackendError) -> AuthFailure {
        let failure = AuthFailure::classify(err);
        warn!(operation, kind = ?failure.kind, error = %failure.cause, "authentication failed");
        failure
    }

    async fn store_marker(&self, user: &User) {
        let marker = AuthMarker {
            user_id: user.id.clone(),
            remember: true,
            stored_at_ms: self.clock.now_ms(),
        };
        if let Err(err) = self.markers.save(&marker).await {
            warn!(error = %err, "failed to persist auth marker");
        }
    }

    async fn clear_markers(&self) {
        if let Err(err) = self.markers.clear().await {
            warn!(error = %err, "failed to clear auth markers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{user, FakeBackend, FixedClock, MemoryMarkers};
    use lp_core::{AuthFailureKind, BackendError};
    use std::sync::atomic::Ordering;

    fn controller(
        backend: Arc<FakeBackend>,
    ) -> (Arc<SessionController>, Arc<MemoryMarkers>, Arc<SyncBus>) {
        let markers = Arc::new(MemoryMarkers::default());
        let bus = Arc::new(SyncBus::new());
        let session = Arc::new(SessionController::new(
            backend,
            markers.clone(),
            Arc::new(FixedClock(1_700_000_000_000)),
            bus.clone(),
        ));
        (session, markers, bus)
    }

    fn credentials(remember: bool) -> Credentials {
        Credentials {
            email: "founder@example.com".into(),
            password: "secret-pass".into(),
            remember,
        }
    }

    #[tokio::test]
    async fn startup_resolution_sets_user() {
        let backend = Arc::new(FakeBackend::with_session(Some(user("u1", true))));
        let (session, _, _) = controller(backend);

        let resolved = session.resolve_session(ResolveReason::Startup).await;

        assert_eq!(resolved, Some(user("u1", true)));
        assert_eq!(session.current_user(), Some(user("u1", true)));
    }

    #[tokio::test]
    async fn startup_failure_means_no_user() {
        let backend = Arc::new(FakeBackend::new());
        *backend.resolve_result.lock().unwrap() = Err(BackendError::Timeout);
        let (session, _, _) = controller(backend);

        assert_eq!(session.resolve_session(ResolveReason::Startup).await, None);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn refresh_failure_keeps_known_user() {
        let backend = Arc::new(FakeBackend::with_session(Some(user("u1", true))));
        let (session, _, _) = controller(backend.clone());
        session.resolve_session(ResolveReason::Startup).await;

        *backend.resolve_result.lock().unwrap() = Err(BackendError::Network("down".into()));
        for reason in [
            ResolveReason::Reconnect,
            ResolveReason::Heartbeat,
            ResolveReason::AuthEvent,
        ] {
            assert_eq!(session.resolve_session(reason).await, None);
            assert_eq!(session.current_user(), Some(user("u1", true)));
        }
    }

    #[tokio::test]
    async fn refresh_reporting_no_session_clears_user() {
        let backend = Arc::new(FakeBackend::with_session(Some(user("u1", true))));
        let (session, _, _) = controller(backend.clone());
        session.resolve_session(ResolveReason::Startup).await;

        *backend.resolve_result.lock().unwrap() = Ok(None);
        session.resolve_session(ResolveReason::Reconnect).await;

        assert_eq!(session.current_user(), None);
    }

    #[tokio::test]
    async fn signed_in_event_resolves_and_bumps() {
        let backend = Arc::new(FakeBackend::with_session(Some(user("u2", false))));
        let (session, _, bus) = controller(backend.clone());

        session.on_auth_event(AuthEvent::SignedIn, None).await;
        session
            .on_auth_event(AuthEvent::TokenRefreshed, Some(AuthSession::default()))
            .await;

        assert_eq!(session.current_user(), Some(user("u2", false)));
        assert_eq!(bus.current().value(), 2);
        assert_eq!(backend.resolve_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn signed_out_event_clears_user_and_markers() {
        let backend = Arc::new(FakeBackend::new());
        *backend.login_result.lock().unwrap() = Ok(user("u1", true));
        let (session, markers, _) = controller(backend);
        session.login(&credentials(true)).await.unwrap();
        assert!(markers.marker.lock().unwrap().is_some());

        session.on_auth_event(AuthEvent::SignedOut, None).await;

        assert_eq!(session.current_user(), None);
        assert!(markers.marker.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn remembered_login_persists_marker() {
        let backend = Arc::new(FakeBackend::new());
        *backend.login_result.lock().unwrap() = Ok(user("u1", true));
        let (session, markers, _) = controller(backend);

        let logged_in = session.login(&credentials(true)).await.unwrap();

        assert_eq!(logged_in.id.as_str(), "u1");
        let marker = markers.marker.lock().unwrap().clone().unwrap();
        assert_eq!(marker.user_id.as_str(), "u1");
        assert_eq!(marker.stored_at_ms, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn login_failure_is_classified_and_state_untouched() {
        let backend = Arc::new(FakeBackend::new());
        *backend.login_result.lock().unwrap() = Err(BackendError::rejected(
            400,
            Some("invalid_credentials"),
            "Invalid login credentials",
        ));
        let (session, markers, _) = controller(backend);

        let failure = session.login(&credentials(true)).await.unwrap_err();

        assert_eq!(failure.kind, AuthFailureKind::InvalidCredentials);
        assert_eq!(failure.message(), "Incorrect email or password.");
        assert!(!session.is_authenticated());
        assert!(markers.marker.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_state_even_when_backend_rejects() {
        let backend = Arc::new(FakeBackend::new());
        *backend.login_result.lock().unwrap() = Ok(user("u1", true));
        *backend.logout_result.lock().unwrap() = Err(BackendError::Network("offline".into()));
        let (session, markers, _) = controller(backend.clone());
        session.login(&credentials(true)).await.unwrap();

        session.logout().await;

        assert_eq!(session.current_user(), None);
        assert_eq!(backend.logout_calls.load(Ordering::SeqCst), 1);
        assert_eq!(markers.clear_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sign_out_echo_after_logout_is_idempotent() {
        let backend = Arc::new(FakeBackend::new());
        *backend.login_result.lock().unwrap() = Ok(user("u1", true));
        let (session, markers, _) = controller(backend);
        session.login(&credentials(true)).await.unwrap();

        session.logout().await;
        session.on_auth_event(AuthEvent::SignedOut, None).await;

        assert_eq!(session.current_user(), None);
        assert_eq!(markers.clear_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn replace_user_only_applies_to_active_user() {
        let backend = Arc::new(FakeBackend::new());
        *backend.demo_result.lock().unwrap() = Ok(user("u1", false));
        let (session, _, _) = controller(backend);

        assert!(!session.replace_user(user("u1", true)));
        session.login_as_demo().await.unwrap();

        assert!(!session.replace_user(user("other", true)));
        assert!(session.replace_user(user("u1", true)));
        assert_eq!(session.current_user(), Some(user("u1", true)));
    }

    #[tokio::test]
    async fn resolution_started_before_logout_does_not_resurrect_user() {
        let backend = Arc::new(FakeBackend::new());
        backend.gate_resolution();
        let (session, _, _) = controller(backend.clone());

        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.resolve_session(ResolveReason::Reconnect).await }
        });
        backend.wait_parked(1).await;

        session.logout().await;
        backend.release(0, Ok(Some(user("u1", true))));
        pending.await.unwrap();

        assert_eq!(session.current_user(), None);
    }

    #[tokio::test]
    async fn interleaved_startup_and_signed_in_converge_on_last_completed() {
        for release_order in [[0usize, 1], [1, 0]] {
            let backend = Arc::new(FakeBackend::new());
            backend.gate_resolution();
            let (session, _, _) = controller(backend.clone());

            let startup = tokio::spawn({
                let session = session.clone();
                async move {
                    session.resolve_session(ResolveReason::Startup).await;
                }
            });
            backend.wait_parked(1).await;
            let echo = tokio::spawn({
                let session = session.clone();
                async move { session.on_auth_event(AuthEvent::SignedIn, None).await }
            });
            backend.wait_parked(2).await;

            let answers = [user("first", true), user("second", true)];
            let mut tasks = [Some(startup), Some(echo)];
            for index in release_order {
                backend.release(index, Ok(Some(answers[index].clone())));
                tasks[index].take().unwrap().await.unwrap();
            }

            let [_, b] = release_order;
            assert_eq!(session.current_user(), Some(answers[b].clone()));
        }
    }
}
