//! Validation errors for subscriber input

use thiserror::Error;

/// Client-caused input errors. Raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid site")]
    InvalidSite,
}
