//! Render-time access control.
//!
//! The guard projects the stored page onto what may actually be shown. It
//! never writes back to the stored page, so a session that comes back later
//! reveals the requested page without another navigation.

use serde::Serialize;

use crate::page::Page;
use crate::user::User;

/// What the content area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderTarget {
    Page { page: Page },
    /// A protected page was requested without a session.
    LoginPrompt { requested: Page },
}

impl RenderTarget {
    pub fn shows_chrome(&self) -> bool {
        match self {
            RenderTarget::Page { page } => page.shows_chrome(),
            RenderTarget::LoginPrompt { .. } => false,
        }
    }
}

/// Resolve which content to render for `page` given the current user.
pub fn resolve_render(page: Page, user: Option<&User>) -> RenderTarget {
    match user {
        Some(user) if !user.onboarding_completed && !page.bypasses_onboarding_gate() => {
            RenderTarget::Page {
                page: Page::Onboarding,
            }
        }
        Some(_) => RenderTarget::Page { page },
        None if page.is_protected() => RenderTarget::LoginPrompt { requested: page },
        None => RenderTarget::Page { page },
    }
}
