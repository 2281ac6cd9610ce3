//! Sync generation broadcast.
//!
//! Producers call [`SyncBus::bump`] whenever upstream state may have changed.
//! Consumers compare the counter against the last value they acted on; the
//! bus carries no cause, so consumers must tolerate spurious bumps.

use lp_core::SyncGeneration;
use tokio::sync::watch;
use tracing::debug;

pub struct SyncBus {
    tx: watch::Sender<SyncGeneration>,
}

impl SyncBus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SyncGeneration::INITIAL);
        Self { tx }
    }

    pub fn current(&self) -> SyncGeneration {
        *self.tx.borrow()
    }

    /// Advance the counter and wake all subscribers.
    pub fn bump(&self) -> SyncGeneration {
        let mut bumped = SyncGeneration::INITIAL;
        self.tx.send_modify(|generation| {
            *generation = generation.next();
            bumped = *generation;
        });
        debug!(generation = %bumped, "sync generation bumped");
        bumped
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncGeneration> {
        self.tx.subscribe()
    }
}

impl Default for SyncBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Last generation a view has acted on.
#[derive(Debug, Clone, Copy)]
pub struct SyncCursor {
    last_seen: SyncGeneration,
}

impl SyncCursor {
    pub fn new(bus: &SyncBus) -> Self {
        Self {
            last_seen: bus.current(),
        }
    }

    /// Returns true once per observed change, however many bumps it covers.
    pub fn poll(&mut self, bus: &SyncBus) -> bool {
        let current = bus.current();
        if current == self.last_seen {
            return false;
        }
        self.last_seen = current;
        true
    }

    pub fn last_seen(&self) -> SyncGeneration {
        self.last_seen
    }
}
