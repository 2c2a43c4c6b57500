//! Subscriber domain types

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ValidationError;

// =============================================================================
// Sites
// =============================================================================

/// A tenant served by this deployment. The set is closed: anything else is
/// rejected before it reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// Primary domain, served from the default content tree
    Kaigritun,
    GetTheJobAi,
    GigWithAi,
}

impl Site {
    /// Every known site, in declaration order
    pub const ALL: [Site; 3] = [Site::Kaigritun, Site::GetTheJobAi, Site::GigWithAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kaigritun => "kaigritun",
            Self::GetTheJobAi => "getthejobai",
            Self::GigWithAi => "gigwithai",
        }
    }

    /// Human readable name used in outbound messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Kaigritun => "Kai Gritun",
            Self::GetTheJobAi => "GetTheJobAI",
            Self::GigWithAi => "GigWithAI",
        }
    }

    /// Parse a site identifier. Identifiers are matched exactly.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|site| site.as_str() == s.trim())
            .ok_or(ValidationError::InvalidSite)
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Site {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =============================================================================
// Subscriber email
// =============================================================================

/// A trimmed, lowercased email address that passed minimal syntax checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Normalize and validate an email address.
    ///
    /// Only checks for a non-empty value containing `@` and `.`; full RFC 5322
    /// validation is deliberately not attempted.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let email = raw.trim().to_lowercase();

        if email.is_empty() || !email.contains('@') || !email.contains('.') {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Stored records
// =============================================================================

/// A persisted subscription. Unique on `(email, site)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub email: SubscriberEmail,
    pub site: Site,
    #[serde(with = "time::serde::rfc3339")]
    pub subscribed_at: OffsetDateTime,
}

impl Subscriber {
    /// Create a record stamped with the current time
    pub fn new(email: SubscriberEmail, site: Site) -> Self {
        Self {
            email,
            site,
            subscribed_at: OffsetDateTime::now_utc(),
        }
    }

    /// Whether this record belongs to the given `(email, site)` pair
    pub fn matches(&self, email: &SubscriberEmail, site: Site) -> bool {
        self.site == site && self.email.as_ref().eq_ignore_ascii_case(email.as_ref())
    }
}
