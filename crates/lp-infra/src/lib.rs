//! # lp-infra
//!
//! Adapters implementing the `lp-core` ports: HTTP auth backend, in-process
//! auth event hub, file-backed auth markers, system clock and the headless
//! platform signal source.

pub mod auth_hub;
pub mod auth_markers;
pub mod backend;
pub mod paths;
pub mod platform;
pub mod time;

pub use auth_hub::AuthEventHub;
pub use auth_markers::FileAuthMarkerStore;
pub use backend::HttpBackendClient;
pub use paths::AppPaths;
pub use platform::{ChannelPlatformSignals, HeadlessViewport};
pub use time::SystemClock;
