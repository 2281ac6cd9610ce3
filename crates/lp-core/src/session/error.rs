use std::fmt;

use serde::Serialize;

/// Failure reported by the backend capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Network(String),

    #[error("backend request timed out")]
    Timeout,

    #[error("backend rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("malformed backend response: {0}")]
    Decode(String),

    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

impl BackendError {
    pub fn rejected(status: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Connectivity-level failures that say nothing about the session itself.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Network(_) | BackendError::Timeout => true,
            BackendError::Rejected { status, .. } => *status >= 500,
            BackendError::Decode(_) | BackendError::NotConfigured(_) => false,
        }
    }
}

/// User-facing category of a failed login or signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailureKind {
    EmailNotVerified,
    InvalidCredentials,
    DuplicateAccount,
    Unclassified,
}

impl AuthFailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailureKind::EmailNotVerified => {
                "Please confirm your email address before signing in."
            }
            AuthFailureKind::InvalidCredentials => "Incorrect email or password.",
            AuthFailureKind::DuplicateAccount => "An account with this email already exists.",
            AuthFailureKind::Unclassified => "Something went wrong. Please try again.",
        }
    }
}

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Classified login/signup failure surfaced to the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct AuthFailure {
    pub kind: AuthFailureKind,
    #[source]
    pub cause: BackendError,
}

impl AuthFailure {
    pub fn classify(cause: BackendError) -> Self {
        let kind = match &cause {
            BackendError::Rejected {
                status,
                code,
                message,
            } => classify_rejection(*status, code.as_deref(), message),
            _ => AuthFailureKind::Unclassified,
        };
        Self { kind, cause }
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

fn classify_rejection(status: u16, code: Option<&str>, message: &str) -> AuthFailureKind {
    let message = message.to_ascii_lowercase();
    match code {
        Some("email_not_confirmed") => return AuthFailureKind::EmailNotVerified,
        Some("invalid_credentials") => return AuthFailureKind::InvalidCredentials,
        Some("user_already_exists") | Some("email_exists") => {
            return AuthFailureKind::DuplicateAccount
        }
        _ => {}
    }

    if message.contains("email not confirmed") || message.contains("not verified") {
        AuthFailureKind::EmailNotVerified
    } else if message.contains("invalid login credentials")
        || message.contains("invalid credentials")
    {
        AuthFailureKind::InvalidCredentials
    } else if status == 409
        || message.contains("already registered")
        || message.contains("already exists")
    {
        AuthFailureKind::DuplicateAccount
    } else {
        AuthFailureKind::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_code() {
        let failure = AuthFailure::classify(BackendError::rejected(
            400,
            Some("email_not_confirmed"),
            "whatever",
        ));
        assert_eq!(failure.kind, AuthFailureKind::EmailNotVerified);

        let failure =
            AuthFailure::classify(BackendError::rejected(422, Some("user_already_exists"), ""));
        assert_eq!(failure.kind, AuthFailureKind::DuplicateAccount);
    }

    #[test]
    fn classify_by_message() {
        let failure = AuthFailure::classify(BackendError::rejected(
            400,
            None,
            "Invalid login credentials",
        ));
        assert_eq!(failure.kind, AuthFailureKind::InvalidCredentials);

        let failure = AuthFailure::classify(BackendError::rejected(
            400,
            None,
            "Email not confirmed",
        ));
        assert_eq!(failure.kind, AuthFailureKind::EmailNotVerified);

        let failure = AuthFailure::classify(BackendError::rejected(
            422,
            None,
            "User already registered",
        ));
        assert_eq!(failure.kind, AuthFailureKind::DuplicateAccount);
    }

    #[test]
    fn conflict_status_means_duplicate_account() {
        let failure = AuthFailure::classify(BackendError::rejected(409, None, "conflict"));
        assert_eq!(failure.kind, AuthFailureKind::DuplicateAccount);
    }

    #[test]
    fn network_errors_are_unclassified() {
        let failure = AuthFailure::classify(BackendError::Network("dns".into()));
        assert_eq!(failure.kind, AuthFailureKind::Unclassified);
        assert_eq!(failure.to_string(), "Something went wrong. Please try again.");
    }

    #[test]
    fn transient_errors() {
        assert!(BackendError::Timeout.is_transient());
        assert!(BackendError::rejected(503, None, "down").is_transient());
        assert!(!BackendError::rejected(401, None, "nope").is_transient());
    }
}
