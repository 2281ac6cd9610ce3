//! # lp-core
//!
//! Core domain models and state machines for the Launchpad client shell.
//!
//! This crate contains pure logic without any infrastructure dependencies.

pub mod config;
pub mod connectivity;
pub mod ids;
pub mod navigation;
pub mod page;
pub mod ports;
pub mod session;
pub mod sync;
pub mod user;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use connectivity::{ConnectivityIndicator, ConnectivityState};
pub use ids::UserId;
pub use navigation::{RenderTarget, TransitionStage, TransitionState, TransitionTimings};
pub use page::Page;
pub use session::{AuthEvent, AuthFailure, AuthFailureKind, BackendError, ResolveReason};
pub use sync::SyncGeneration;
pub use user::{Credentials, OAuthProvider, SignupRequest, User};
