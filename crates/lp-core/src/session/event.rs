use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events delivered by the external auth-event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn,
    TokenRefreshed,
    SignedOut,
}

/// Opaque session payload attached to an auth event.
///
/// Only carried through; identity is always re-read from the backend.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// One item of an auth-event subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEventEnvelope {
    pub event: AuthEvent,
    pub session: Option<AuthSession>,
}

impl AuthEventEnvelope {
    pub fn new(event: AuthEvent, session: Option<AuthSession>) -> Self {
        Self { event, session }
    }
}

/// Why a session resolution was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveReason {
    /// First resolution when the shell boots.
    Startup,
    /// Browser came back online.
    Reconnect,
    /// Liveness probe requested re-validation.
    Heartbeat,
    /// Echo of a signed-in or token-refreshed auth event.
    AuthEvent,
}

impl ResolveReason {
    /// Refresh resolutions must not clobber a known user on transient failure.
    pub fn is_refresh(&self) -> bool {
        !matches!(self, ResolveReason::Startup)
    }
}
