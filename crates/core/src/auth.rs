use std::fmt::{Debug, Formatter};

use crate::{AppResult, NonEmptyString};

/// Bearer credential sent in the `Authorization` header.
///
/// The secret never appears in `Debug` output so configuration structs can
/// be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(NonEmptyString);

impl BearerToken {
    /// Creates a bearer token, rejecting empty or whitespace values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value.into().trim())?))
    }

    /// Returns the raw secret value.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the full `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0.as_str())
    }
}

impl Debug for BearerToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("BearerToken(<redacted>)")
    }
}
