//! Port interfaces for the application layer
//!
//! Ports define the contract between the controllers in `lp-app` and the
//! adapters in `lp-infra`. Controllers only ever see these traits, so tests
//! drive them with fakes and synthetic event sequences.

pub mod auth_events;
pub mod auth_markers;
pub mod backend;
mod clock;
pub mod platform;
mod viewport;

pub use auth_events::{AuthEventReceiver, AuthEventStreamPort, AuthSubscription, UnsubscribeHandle};
pub use auth_markers::{AuthMarker, AuthMarkerStorePort};
pub use backend::BackendClientPort;
pub use clock::*;
pub use platform::{PlatformSignal, PlatformSignalPort, PlatformSignalReceiver, ReachabilityPort};
pub use viewport::ViewportPort;
