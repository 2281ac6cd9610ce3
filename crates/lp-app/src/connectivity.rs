//! Connectivity monitor.
//!
//! Turns platform reachability and visibility transitions into refresh
//! requests. It owns nothing but the connectivity flags.

use std::sync::Arc;

use lp_core::ports::{BackendClientPort, ReachabilityPort};
use lp_core::{ConnectivityState, ResolveReason};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::session::SessionController;
use crate::sync_bus::SyncBus;

pub struct ConnectivityMonitor {
    state_tx: watch::Sender<ConnectivityState>,
    backend: Arc<dyn BackendClientPort>,
    session: Arc<SessionController>,
    sync_bus: Arc<SyncBus>,
}

impl ConnectivityMonitor {
    pub fn new(
        reachability: &dyn ReachabilityPort,
        backend: Arc<dyn BackendClientPort>,
        session: Arc<SessionController>,
        sync_bus: Arc<SyncBus>,
    ) -> Self {
        let (state_tx, _rx) = watch::channel(ConnectivityState::new(reachability.is_online()));
        Self {
            state_tx,
            backend,
            session,
            sync_bus,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        *self.state_tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state_tx.borrow().online
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.state_tx.subscribe()
    }

    /// Edge for the platform "online" event.
    ///
    /// Only an actual offline-to-online transition bumps the sync generation
    /// and re-resolves the session. Returns whether that happened.
    pub async fn on_online(&self) -> bool {
        let transitioned = self.state_tx.send_if_modified(|state| {
            if state.online {
                return false;
            }
            state.online = true;
            true
        });
        if !transitioned {
            debug!("online event while already online, ignoring");
            return false;
        }

        info!("connectivity restored, requesting refresh");
        self.sync_bus.bump();
        self.session.resolve_session(ResolveReason::Reconnect).await;
        true
    }

    /// Edge for the platform "offline" event. Never touches the network.
    pub fn on_offline(&self) -> bool {
        let transitioned = self.state_tx.send_if_modified(|state| {
            if !state.online {
                return false;
            }
            state.online = false;
            true
        });
        if transitioned {
            info!("connectivity lost");
        }
        transitioned
    }

    /// Edge for tab visibility changes.
    ///
    /// Becoming visible runs one liveness probe; a failed probe is treated
    /// like a reconnect and bumps the sync generation.
    pub async fn on_visibility_changed(&self, visible: bool) {
        if !visible {
            return;
        }
        if !self.is_online() {
            debug!("tab visible while offline, skipping probe");
            return;
        }

        let healthy = match self.backend.check_health().await {
            Ok(healthy) => healthy,
            Err(err) => {
                warn!(error = %err, "liveness probe on refocus failed");
                false
            }
        };
        self.record_probe(healthy);
        if !healthy {
            info!("backend unhealthy on refocus, requesting refresh");
            self.sync_bus.bump();
        }
    }

    /// Store the outcome of the latest liveness probe.
    pub fn record_probe(&self, healthy: bool) {
        self.state_tx.send_if_modified(|state| {
            if state.healthy == healthy {
                return false;
            }
            state.healthy = healthy;
            true
        });
    }
}
