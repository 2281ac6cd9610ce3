//! Route identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every page the shell can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Home,
    Product,
    Solutions,
    Security,
    Customers,
    Careers,
    Contact,
    About,
    Onboarding,
    Login,
    Dashboard,
    Intelligence,
}

impl Page {
    pub const ALL: [Page; 12] = [
        Page::Home,
        Page::Product,
        Page::Solutions,
        Page::Security,
        Page::Customers,
        Page::Careers,
        Page::Contact,
        Page::About,
        Page::Onboarding,
        Page::Login,
        Page::Dashboard,
        Page::Intelligence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Product => "product",
            Page::Solutions => "solutions",
            Page::Security => "security",
            Page::Customers => "customers",
            Page::Careers => "careers",
            Page::Contact => "contact",
            Page::About => "about",
            Page::Onboarding => "onboarding",
            Page::Login => "login",
            Page::Dashboard => "dashboard",
            Page::Intelligence => "intelligence",
        }
    }

    /// Pages that render a login prompt when nobody is signed in.
    pub fn is_protected(&self) -> bool {
        matches!(self, Page::Onboarding | Page::Dashboard)
    }

    /// Pages an incomplete-onboarding user may still visit.
    pub fn bypasses_onboarding_gate(&self) -> bool {
        matches!(self, Page::Home | Page::Login | Page::Onboarding)
    }

    /// Whether the marketing nav and footer wrap this page.
    pub fn shows_chrome(&self) -> bool {
        !matches!(
            self,
            Page::Login | Page::Onboarding | Page::Dashboard | Page::Intelligence
        )
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page: {0}")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Page::ALL
            .into_iter()
            .find(|page| page.as_str() == needle)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}
