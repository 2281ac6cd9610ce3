use async_trait::async_trait;

use crate::session::BackendError;
use crate::user::{Credentials, OAuthProvider, SignupRequest, User};

/// Persistence/service layer as seen by the client core.
///
/// Every call may fail; failures come back as [`BackendError`] and are
/// classified or swallowed by the caller, never raised further.
#[async_trait]
pub trait BackendClientPort: Send + Sync {
    /// Identity persisted for this client.
    /// - `Ok(None)` means the backend explicitly reports no session.
    async fn resolve_current_user(&self) -> Result<Option<User>, BackendError>;

    async fn login(&self, credentials: &Credentials) -> Result<User, BackendError>;

    async fn signup(&self, request: &SignupRequest) -> Result<User, BackendError>;

    async fn create_demo_user(&self) -> Result<User, BackendError>;

    async fn logout(&self) -> Result<(), BackendError>;

    /// Lightweight liveness probe. `Ok(false)` means reachable but unhealthy.
    async fn check_health(&self) -> Result<bool, BackendError>;

    /// Start a redirect-based login. The user arrives later through the
    /// auth-event stream.
    async fn login_with_oauth_provider(&self, provider: &OAuthProvider)
        -> Result<(), BackendError>;
}
