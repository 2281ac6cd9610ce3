//! Browser platform signals, consumed as triggers only.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformSignal {
    Online,
    Offline,
    VisibilityChanged { visible: bool },
}

pub type PlatformSignalReceiver = mpsc::UnboundedReceiver<PlatformSignal>;

/// Current network reachability as reported by the platform.
pub trait ReachabilityPort: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Source of reachability and visibility transitions.
///
/// Dropping the receiver detaches the listener.
pub trait PlatformSignalPort: Send + Sync {
    fn subscribe(&self) -> PlatformSignalReceiver;
}
