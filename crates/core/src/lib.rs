//! Shared primitives for all Rust crates of the Miro connector.

#![forbid(unsafe_code)]

/// Credential primitives shared across crates.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::BearerToken;

/// Result type used across connector crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common connector error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required account profile field is absent or empty.
    #[error("{0} is required")]
    MissingProfileField(String),

    /// Page token could not be decoded.
    #[error("malformed page token: {0}")]
    MalformedPageToken(String),

    /// Page token belongs to another resource type traversal.
    #[error("page token was issued for resource type '{found}', expected '{expected}'")]
    PageTokenMismatch {
        /// Resource type the caller asked for.
        expected: String,
        /// Resource type recorded in the token.
        found: String,
    },

    /// Page token belongs to another parent resource of the same type.
    #[error("page token was issued for resource '{found}', expected '{expected}'")]
    PageTokenResourceMismatch {
        /// Resource the caller asked for.
        expected: String,
        /// Resource recorded in the token.
        found: String,
    },

    /// Entitlement identifier does not follow `type:resource:slug`.
    #[error("invalid entitlement ID: {0}")]
    MalformedEntitlementId(String),

    /// Upstream timestamp is not valid RFC3339.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Principal resource type is not allowed for the operation.
    #[error("invalid principal type: {0}")]
    InvalidPrincipalType(String),

    /// Team role outside the fixed team role enumeration.
    #[error("invalid team role: {0}")]
    InvalidRole(String),

    /// Organization role slug or key missing from the role catalog.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// License value missing from the license catalog.
    #[error("unknown license: {0}")]
    UnknownLicense(String),

    /// Operation depends on a credential that was not configured.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Upstream rejected the credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Requested upstream resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport or decoding failure talking to the upstream platform.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Prefixes the error message with an operation description.
    ///
    /// The variant is preserved so callers can still match on the category.
    #[must_use]
    pub fn context(self, operation: &str) -> Self {
        let prefix = |message: String| format!("miro-connector: {operation}: {message}");
        match self {
            Self::Validation(message) => Self::Validation(prefix(message)),
            Self::Unauthorized(message) => Self::Unauthorized(prefix(message)),
            Self::NotFound(message) => Self::NotFound(prefix(message)),
            Self::Upstream(message) => Self::Upstream(prefix(message)),
            Self::NotConfigured(message) => Self::NotConfigured(prefix(message)),
            Self::Internal(message) => Self::Internal(prefix(message)),
            other => other,
        }
    }
}
