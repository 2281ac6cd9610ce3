//! # lp-app
//!
//! Controllers of the Launchpad client shell.
//!
//! Each controller is the single writer of one piece of state (current user,
//! connectivity, sync generation, active page and transition stage) and
//! talks to the outside world only through the ports in `lp_core::ports`.

pub mod connectivity;
pub mod heartbeat;
pub mod navigation;
pub mod session;
pub mod shell;
pub mod sync_bus;

#[cfg(test)]
mod test_support;

pub use connectivity::ConnectivityMonitor;
pub use heartbeat::{HeartbeatOutcome, HeartbeatProbe, HeartbeatScheduler};
pub use navigation::{NavigateOutcome, NavigationController, TransitionHandle, TransitionHook};
pub use session::SessionController;
pub use shell::{AppShell, AppShellDeps, ShellSettings, ShellView};
pub use sync_bus::{SyncBus, SyncCursor};
