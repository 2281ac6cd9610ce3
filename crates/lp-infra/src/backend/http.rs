//! HTTP implementation of [`BackendClientPort`].
//!
//! Talks to a GoTrue-style REST auth API. The access token lives only in
//! memory; every sign-in and sign-out is echoed through the
//! [`AuthEventHub`] so the shell sees the same stream a browser SDK would
//! deliver.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lp_core::config::BackendConfig;
use lp_core::ports::BackendClientPort;
use lp_core::session::{AuthEvent, AuthSession};
use lp_core::{BackendError, Credentials, OAuthProvider, SignupRequest, User};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::dto::{
    ErrorBodyDto, PasswordGrantDto, SignupDto, SignupProfileDto, SignupResponseDto,
    TokenResponseDto, UserDto,
};
use crate::auth_hub::AuthEventHub;

const DEMO_USER_PATH: &str = "/functions/v1/create-demo-user";

pub struct HttpBackendClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    session: Mutex<Option<StoredSession>>,
    events: AuthEventHub,
}

/// The session this client currently signs requests with.
struct StoredSession {
    access_token: String,
    /// Issued by the demo function. `/auth/v1/user` does not report this,
    /// so it is re-applied on every lookup.
    is_demo: bool,
}

impl HttpBackendClient {
    pub fn new(config: &BackendConfig, events: AuthEventHub) -> Result<Self, BackendError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BackendError::NotConfigured("backend.base_url is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| BackendError::NotConfigured(e.to_string()))?;

        let api_key = Some(config.api_key.trim().to_string()).filter(|key| !key.is_empty());

        Ok(Self {
            client,
            base_url,
            api_key,
            session: Mutex::new(None),
            events,
        })
    }

    /// Where the user should be sent to sign in with `provider`.
    pub fn authorize_url(&self, provider: &OAuthProvider) -> String {
        format!(
            "{}/auth/v1/authorize?provider={}",
            self.base_url,
            provider.as_str()
        )
    }

    /// Adopt a session handed back by an OAuth redirect.
    pub fn accept_oauth_session(&self, access_token: String, expires_in: Option<i64>) {
        let session = AuthSession {
            access_token: Some(access_token.clone()),
            expires_at: expires_in.map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        };
        self.store_token(Some(access_token));
        self.events.publish(AuthEvent::SignedIn, Some(session));
    }

    pub fn has_session(&self) -> bool {
        self.lock_session().is_some()
    }

    fn is_demo_session(&self) -> bool {
        self.lock_session()
            .as_ref()
            .is_some_and(|session| session.is_demo)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match &self.api_key {
            Some(key) => builder.header("apikey", key),
            None => builder,
        };
        match self.lock_session().as_ref() {
            Some(session) => builder.bearer_auth(&session.access_token),
            None => builder,
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store_token(&self, token: Option<String>) {
        self.store_session(token, false);
    }

    fn store_session(&self, token: Option<String>, is_demo: bool) {
        *self.lock_session() = token.map(|access_token| StoredSession {
            access_token,
            is_demo,
        });
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = self.request(builder).send().await.map_err(transport_error)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(rejection(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Store the new session and echo it as a sign-in.
    fn adopt(&self, token: TokenResponseDto, is_demo: bool) -> User {
        let session = token.session(Utc::now());
        self.store_session(Some(token.access_token), is_demo);
        let mut user = token.user.into_user();
        user.is_demo |= is_demo;
        self.events.publish(AuthEvent::SignedIn, Some(session));
        user
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

async fn rejection(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed = ErrorBodyDto::parse(&body);
    let message = parsed.message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request rejected")
            .to_string()
    });
    BackendError::rejected(status.as_u16(), parsed.code.as_deref(), message)
}

#[async_trait]
impl BackendClientPort for HttpBackendClient {
    async fn resolve_current_user(&self) -> Result<Option<User>, BackendError> {
        if !self.has_session() {
            debug!("no stored access token, no session");
            return Ok(None);
        }

        let request = self.client.get(self.url("/auth/v1/user"));
        match self.send_json::<UserDto>(request).await {
            Ok(user) => {
                let mut user = user.into_user();
                user.is_demo |= self.is_demo_session();
                Ok(Some(user))
            }
            Err(BackendError::Rejected { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                info!(status, "access token no longer accepted");
                self.store_token(None);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, BackendError> {
        let request = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&PasswordGrantDto {
                email: &credentials.email,
                password: &credentials.password,
            });
        let token: TokenResponseDto = self.send_json(request).await?;
        Ok(self.adopt(token, false))
    }

    async fn signup(&self, request: &SignupRequest) -> Result<User, BackendError> {
        let body = SignupDto {
            email: &request.email,
            password: &request.password,
            data: SignupProfileDto {
                first_name: &request.first_name,
                last_name: &request.last_name,
            },
        };
        let builder = self.client.post(self.url("/auth/v1/signup")).json(&body);
        match self.send_json::<SignupResponseDto>(builder).await? {
            SignupResponseDto::Session(token) => Ok(self.adopt(token, false)),
            SignupResponseDto::Pending(user) => {
                info!("signup accepted, email confirmation pending");
                Ok(user.into_user())
            }
        }
    }

    async fn create_demo_user(&self) -> Result<User, BackendError> {
        let request = self.client.post(self.url(DEMO_USER_PATH));
        let token: TokenResponseDto = self.send_json(request).await?;
        Ok(self.adopt(token, true))
    }

    async fn logout(&self) -> Result<(), BackendError> {
        let request = self.client.post(self.url("/auth/v1/logout"));
        let result = if self.has_session() {
            self.send(request).await.map(|_| ())
        } else {
            Ok(())
        };

        if let Err(err) = &result {
            warn!(error = %err, "remote sign-out failed, dropping local session anyway");
        }
        self.store_token(None);
        self.events.publish(AuthEvent::SignedOut, None);
        result
    }

    async fn check_health(&self) -> Result<bool, BackendError> {
        let request = self.request(self.client.get(self.url("/auth/v1/health")));
        let response = request.send().await.map_err(transport_error)?;
        Ok(response.status().is_success())
    }

    async fn login_with_oauth_provider(&self, provider: &OAuthProvider) -> Result<(), BackendError> {
        let url = self.authorize_url(provider);
        info!(%provider, %url, "continue sign-in in the browser");
        Ok(())
    }
}
