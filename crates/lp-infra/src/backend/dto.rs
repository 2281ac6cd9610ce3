//! Wire shapes of the auth API.

use chrono::{DateTime, Duration, Utc};
use lp_core::session::AuthSession;
use lp_core::{User, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UserMetadataDto {
    pub first_name: String,
    pub last_name: String,
    pub onboarding_completed: bool,
    pub is_demo: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadataDto,
}

impl UserDto {
    pub fn into_user(self) -> User {
        User {
            id: UserId::from(self.id),
            email: self.email.unwrap_or_default(),
            first_name: self.user_metadata.first_name,
            last_name: self.user_metadata.last_name,
            onboarding_completed: self.user_metadata.onboarding_completed,
            is_demo: self.user_metadata.is_demo,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponseDto {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: UserDto,
}

impl TokenResponseDto {
    pub fn session(&self, now: DateTime<Utc>) -> AuthSession {
        AuthSession {
            access_token: Some(self.access_token.clone()),
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
        }
    }
}

/// Signup answers with a session, or with the bare user while the email
/// address still awaits confirmation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignupResponseDto {
    Session(TokenResponseDto),
    Pending(UserDto),
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrantDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupProfileDto<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: SignupProfileDto<'a>,
}

/// Error body; the API is inconsistent about field names.
#[derive(Debug, Default)]
pub(crate) struct ErrorBodyDto {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ErrorBodyDto {
    pub fn parse(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            return Self::default();
        };
        let text = |key: &str| value.get(key).and_then(|v| v.as_str()).map(str::to_string);
        Self {
            code: text("error_code").or_else(|| text("code")).or_else(|| text("error")),
            message: text("msg")
                .or_else(|| text("error_description"))
                .or_else(|| text("message")),
        }
    }
}
