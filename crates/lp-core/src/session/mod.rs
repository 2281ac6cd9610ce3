//! Session domain: auth events, resolution reasons and failure taxonomy.

pub mod error;
pub mod event;

pub use error::{AuthFailure, AuthFailureKind, BackendError};
pub use event::{AuthEvent, AuthEventEnvelope, AuthSession, ResolveReason};
