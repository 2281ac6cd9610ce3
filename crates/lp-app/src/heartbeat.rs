//! Periodic backend liveness probe.
//!
//! Runs only while a user is signed in. A failed probe while online is
//! handled the same way as a reconnect: the sync generation is bumped so
//! views refetch.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lp_core::ports::BackendClientPort;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn, Instrument};

use crate::connectivity::ConnectivityMonitor;
use crate::sync_bus::SyncBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    Healthy,
    /// Probe failed while online; a refresh was signalled.
    StaleSignalled,
    SkippedOffline,
}

/// One probe round, independent of scheduling.
#[derive(Clone)]
pub struct HeartbeatProbe {
    backend: Arc<dyn BackendClientPort>,
    connectivity: Arc<ConnectivityMonitor>,
    sync_bus: Arc<SyncBus>,
}

impl HeartbeatProbe {
    pub fn new(
        backend: Arc<dyn BackendClientPort>,
        connectivity: Arc<ConnectivityMonitor>,
        sync_bus: Arc<SyncBus>,
    ) -> Self {
        Self {
            backend,
            connectivity,
            sync_bus,
        }
    }

    pub async fn probe_once(&self) -> HeartbeatOutcome {
        if !self.connectivity.is_online() {
            debug!("offline, skipping heartbeat probe");
            return HeartbeatOutcome::SkippedOffline;
        }

        let healthy = match self.backend.check_health().await {
            Ok(healthy) => healthy,
            Err(err) => {
                warn!(error = %err, "heartbeat probe failed");
                false
            }
        };

        // Connectivity may have dropped while the probe was in flight.
        if !self.connectivity.is_online() {
            return HeartbeatOutcome::SkippedOffline;
        }

        self.connectivity.record_probe(healthy);
        if healthy {
            HeartbeatOutcome::Healthy
        } else {
            info!("backend unreachable while online, requesting refresh");
            self.sync_bus.bump();
            HeartbeatOutcome::StaleSignalled
        }
    }
}

pub struct HeartbeatScheduler {
    probe: HeartbeatProbe,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatScheduler {
    pub fn new(probe: HeartbeatProbe, interval: Duration) -> Self {
        Self {
            probe,
            interval,
            task: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start probing. The first probe fires one full interval from now.
    ///
    /// Calling this while already running keeps the existing schedule.
    pub fn start(&self) {
        let mut task = self.lock_task();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let probe = self.probe.clone();
        let period = self.interval;
        let span = tracing::info_span!("heartbeat", interval_secs = period.as_secs());
        let handle = tokio::spawn(
            async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    let outcome = probe.probe_once().await;
                    debug!(?outcome, "heartbeat tick");
                }
            }
            .instrument(span),
        );
        *task = Some(handle);
        debug!("heartbeat started");
    }

    pub fn stop(&self) {
        if let Some(handle) = self.lock_task().take() {
            handle.abort();
            debug!("heartbeat stopped");
        }
    }

    /// Follow the signed-in state: running iff `active`.
    pub fn set_active(&self, active: bool) {
        if active {
            self.start();
        } else {
            self.stop();
        }
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
