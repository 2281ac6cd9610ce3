//! Application shell.
//!
//! Composition root of the controllers. Owns the listener tasks that turn
//! platform signals and auth events into controller edges and tears them
//! down again on shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lp_core::config::AppConfig;
use lp_core::ports::{
    AuthEventStreamPort, AuthMarkerStorePort, BackendClientPort, ClockPort, PlatformSignal,
    PlatformSignalPort, ReachabilityPort, UnsubscribeHandle, ViewportPort,
};
use lp_core::{
    AuthFailure, ConnectivityIndicator, ConnectivityState, Credentials, OAuthProvider, Page,
    RenderTarget, ResolveReason, SignupRequest, SyncGeneration, TransitionStage,
    TransitionTimings, User,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, Instrument};

use crate::connectivity::ConnectivityMonitor;
use crate::heartbeat::{HeartbeatProbe, HeartbeatScheduler};
use crate::navigation::{NavigateOutcome, NavigationController, TransitionHandle, TransitionHook};
use crate::session::SessionController;
use crate::sync_bus::SyncBus;

/// Capabilities the shell is built from.
pub struct AppShellDeps {
    pub backend: Arc<dyn BackendClientPort>,
    pub auth_events: Arc<dyn AuthEventStreamPort>,
    pub markers: Arc<dyn AuthMarkerStorePort>,
    pub clock: Arc<dyn ClockPort>,
    pub reachability: Arc<dyn ReachabilityPort>,
    pub platform: Arc<dyn PlatformSignalPort>,
    pub viewport: Arc<dyn ViewportPort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellSettings {
    pub heartbeat_interval: Duration,
    pub timings: TransitionTimings,
    pub initial_page: Page,
}

impl ShellSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            heartbeat_interval: config.heartbeat_interval(),
            timings: config.transition_timings(),
            initial_page: Page::Home,
        }
    }
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Snapshot of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellView {
    /// Stored page, before the render guard.
    pub page: Page,
    pub content: RenderTarget,
    pub stage: TransitionStage,
    pub show_chrome: bool,
    pub user: Option<User>,
    pub sync_generation: SyncGeneration,
    pub connectivity: ConnectivityState,
    pub indicator: ConnectivityIndicator,
}

pub struct AppShell {
    session: Arc<SessionController>,
    connectivity: Arc<ConnectivityMonitor>,
    heartbeat: Arc<HeartbeatScheduler>,
    navigation: Arc<NavigationController>,
    sync_bus: Arc<SyncBus>,
    auth_events: Arc<dyn AuthEventStreamPort>,
    platform: Arc<dyn PlatformSignalPort>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    auth_subscription: Mutex<Option<UnsubscribeHandle>>,
    started: AtomicBool,
}

impl AppShell {
    pub fn new(deps: AppShellDeps, settings: ShellSettings) -> Self {
        let sync_bus = Arc::new(SyncBus::new());
        let session = Arc::new(SessionController::new(
            deps.backend.clone(),
            deps.markers,
            deps.clock,
            sync_bus.clone(),
        ));
        let connectivity = Arc::new(ConnectivityMonitor::new(
            deps.reachability.as_ref(),
            deps.backend.clone(),
            session.clone(),
            sync_bus.clone(),
        ));
        let heartbeat = Arc::new(HeartbeatScheduler::new(
            HeartbeatProbe::new(deps.backend, connectivity.clone(), sync_bus.clone()),
            settings.heartbeat_interval,
        ));
        let navigation = Arc::new(NavigationController::new(
            settings.initial_page,
            settings.timings,
            deps.viewport,
        ));

        Self {
            session,
            connectivity,
            heartbeat,
            navigation,
            sync_bus,
            auth_events: deps.auth_events,
            platform: deps.platform,
            tasks: Mutex::new(Vec::new()),
            auth_subscription: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }

    /// Attach all listeners and run the startup resolution.
    ///
    /// Listeners are attached before the resolution so an auth event that
    /// arrives while it is in flight is not lost. Calling `start` twice is a
    /// no-op.
    pub async fn start(&self) -> Option<User> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("shell already started");
            return self.session.current_user();
        }

        let span = info_span!("shell.start");
        async {
            let (mut events, unsubscribe) = self.auth_events.subscribe().into_parts();
            *self.lock_subscription() = Some(unsubscribe);

            let session = self.session.clone();
            let auth_loop = tokio::spawn(
                async move {
                    while let Some(envelope) = events.recv().await {
                        session.on_auth_event(envelope.event, envelope.session).await;
                    }
                    debug!("auth event stream closed");
                }
                .instrument(info_span!("shell.auth_events")),
            );

            let mut signals = self.platform.subscribe();
            let connectivity = self.connectivity.clone();
            let platform_loop = tokio::spawn(
                async move {
                    while let Some(signal) = signals.recv().await {
                        match signal {
                            PlatformSignal::Online => {
                                connectivity.on_online().await;
                            }
                            PlatformSignal::Offline => {
                                connectivity.on_offline();
                            }
                            PlatformSignal::VisibilityChanged { visible } => {
                                connectivity.on_visibility_changed(visible).await;
                            }
                        }
                    }
                    debug!("platform signal stream closed");
                }
                .instrument(info_span!("shell.platform_signals")),
            );

            let mut users = self.session.subscribe_user();
            let heartbeat = self.heartbeat.clone();
            let heartbeat_follower = tokio::spawn(async move {
                heartbeat.set_active(users.borrow_and_update().is_some());
                while users.changed().await.is_ok() {
                    let active = users.borrow_and_update().is_some();
                    heartbeat.set_active(active);
                }
            });

            self.lock_tasks()
                .extend([auth_loop, platform_loop, heartbeat_follower]);

            let user = self.session.resolve_session(ResolveReason::Startup).await;
            info!(authenticated = user.is_some(), "shell started");
            user
        }
        .instrument(span)
        .await
    }

    /// Detach every listener and stop the heartbeat.
    pub fn shutdown(&self) {
        for task in self.lock_tasks().drain(..) {
            task.abort();
        }
        if let Some(subscription) = self.lock_subscription().take() {
            subscription.unsubscribe();
        }
        self.heartbeat.stop();
        if self.started.swap(false, Ordering::SeqCst) {
            info!("shell shut down");
        }
    }

    pub fn navigate(&self, page: Page) -> NavigateOutcome {
        self.navigation.navigate(page)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthFailure> {
        let user = self.session.login(credentials).await?;
        self.enter_dashboard().await;
        Ok(user)
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<User, AuthFailure> {
        let user = self.session.signup(request).await?;
        self.enter_dashboard().await;
        Ok(user)
    }

    pub async fn login_as_demo(&self) -> Result<User, AuthFailure> {
        let user = self.session.login_as_demo().await?;
        self.enter_dashboard().await;
        Ok(user)
    }

    /// Hand off to the provider. The user arrives through the auth events.
    pub async fn login_with_oauth(&self, provider: &OAuthProvider) -> Result<(), AuthFailure> {
        self.session.login_with_oauth(provider).await
    }

    /// Navigate home and sign out while the overlay is opaque.
    ///
    /// The returned handle completes once the overlay has left; by then the
    /// user is cleared whatever the backend answered.
    pub async fn logout(&self) -> TransitionHandle {
        let session = self.session.clone();
        let sign_out: TransitionHook = Box::pin(async move { session.logout().await });
        self.navigation
            .navigate_when_idle(Page::Home, Some(sign_out))
            .await
    }

    /// Apply the profile returned by the onboarding flow and move on to
    /// the dashboard.
    pub async fn complete_onboarding(&self, user: User) -> Option<TransitionHandle> {
        if !self.session.replace_user(user) {
            debug!("onboarding result does not match the active user");
            return None;
        }
        Some(self.navigation.navigate_when_idle(Page::Dashboard, None).await)
    }

    pub fn view(&self) -> ShellView {
        let user = self.session.current_user();
        let state = self.navigation.state();
        let content = self.navigation.render_target(user.as_ref());
        let connectivity = self.connectivity.state();
        ShellView {
            page: state.page,
            content,
            stage: state.stage,
            show_chrome: content.shows_chrome(),
            indicator: connectivity.indicator(user.as_ref()),
            user,
            sync_generation: self.sync_bus.current(),
            connectivity,
        }
    }

    pub fn user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn sync_generation(&self) -> SyncGeneration {
        self.sync_bus.current()
    }

    pub fn session(&self) -> &Arc<SessionController> {
        &self.session
    }

    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.connectivity
    }

    pub fn heartbeat(&self) -> &Arc<HeartbeatScheduler> {
        &self.heartbeat
    }

    pub fn navigation(&self) -> &Arc<NavigationController> {
        &self.navigation
    }

    pub fn sync_bus(&self) -> &Arc<SyncBus> {
        &self.sync_bus
    }

    async fn enter_dashboard(&self) {
        // The guard redirects to onboarding when it is still pending.
        let _transition = self
            .navigation
            .navigate_when_idle(Page::Dashboard, None)
            .await;
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_subscription(&self) -> std::sync::MutexGuard<'_, Option<UnsubscribeHandle>> {
        self.auth_subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for AppShell {
    fn drop(&mut self) {
        self.shutdown();
    }
}
