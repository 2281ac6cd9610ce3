//! Headless platform adapters.
//!
//! Without a browser the reachability and visibility signals are injected by
//! whoever drives the process (the stdin driver, tests).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lp_core::ports::{
    PlatformSignal, PlatformSignalPort, PlatformSignalReceiver, ReachabilityPort, ViewportPort,
};
use tokio::sync::mpsc;
use tracing::debug;

/// Channel-backed source of platform signals that also tracks reachability.
#[derive(Clone)]
pub struct ChannelPlatformSignals {
    online: Arc<AtomicBool>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<PlatformSignal>>>>,
}

impl ChannelPlatformSignals {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record the signal and forward it to every listener.
    pub fn emit(&self, signal: PlatformSignal) {
        match signal {
            PlatformSignal::Online => self.online.store(true, Ordering::SeqCst),
            PlatformSignal::Offline => self.online.store(false, Ordering::SeqCst),
            PlatformSignal::VisibilityChanged { .. } => {}
        }

        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(signal).is_ok());
        debug!(?signal, listeners = subscribers.len(), "platform signal emitted");
    }
}

impl Default for ChannelPlatformSignals {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReachabilityPort for ChannelPlatformSignals {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

impl PlatformSignalPort for ChannelPlatformSignals {
    fn subscribe(&self) -> PlatformSignalReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }
}

/// Viewport with nothing to scroll; records resets for diagnostics.
#[derive(Default)]
pub struct HeadlessViewport {
    resets: AtomicU64,
}

impl HeadlessViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::SeqCst)
    }
}

impl ViewportPort for HeadlessViewport {
    fn reset_scroll(&self) {
        let count = self.resets.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(count, "viewport scrolled to top");
    }
}
