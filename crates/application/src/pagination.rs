//! Opaque page tokens threaded through sync calls by the framework.
//!
//! A token is a stack of traversal frames. The current frame carries the
//! upstream cursor for the resource type being listed; parent frames are
//! kept for nested traversals and resume once the child is exhausted.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use miro_connector_core::{AppError, AppResult};
use miro_connector_domain::ResourceTypeId;

/// Upstream page size used by every listing call.
pub const RESOURCE_PAGE_SIZE: u32 = 50;

/// One traversal frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// Resource type being traversed.
    pub resource_type_id: ResourceTypeId,
    /// Parent resource, for nested traversals.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
    /// Upstream cursor, empty on the first page.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl PageState {
    /// Creates a first-page frame.
    #[must_use]
    pub fn new(resource_type_id: ResourceTypeId, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type_id,
            resource_id: resource_id.into(),
            token: String::new(),
        }
    }
}

/// Stack of traversal frames encoded into a single opaque token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBag {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    states: Vec<PageState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_state: Option<PageState>,
}

impl PageBag {
    /// Decodes a token; the empty token is an empty bag.
    pub fn unmarshal(token: &str) -> AppResult<Self> {
        if token.is_empty() {
            return Ok(Self::default());
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(token.as_bytes())
            .map_err(|error| AppError::MalformedPageToken(format!("invalid encoding: {error}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|error| AppError::MalformedPageToken(format!("invalid payload: {error}")))
    }

    /// Encodes the bag; a bag without a current frame encodes to the empty token.
    pub fn marshal(&self) -> AppResult<String> {
        if self.current_state.is_none() {
            return Ok(String::new());
        }

        let payload = serde_json::to_vec(self)
            .map_err(|error| AppError::Internal(format!("failed to encode page token: {error}")))?;

        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Makes `state` the current frame, stacking the previous one.
    pub fn push(&mut self, state: PageState) {
        if let Some(current) = self.current_state.take() {
            self.states.push(current);
        }

        self.current_state = Some(state);
    }

    /// Drops the current frame and resumes its parent.
    pub fn pop(&mut self) -> Option<PageState> {
        let popped = self.current_state.take();
        self.current_state = self.states.pop();
        popped
    }

    /// Returns the current frame.
    #[must_use]
    pub fn current(&self) -> Option<&PageState> {
        self.current_state.as_ref()
    }

    /// Returns the upstream cursor of the current frame, if any.
    #[must_use]
    pub fn page_token(&self) -> Option<&str> {
        self.current_state
            .as_ref()
            .map(|state| state.token.as_str())
            .filter(|token| !token.is_empty())
    }

    /// Records the next upstream cursor and returns the token for the caller.
    ///
    /// An empty cursor closes the current frame; when no parent frame is left
    /// the returned token is empty, meaning the traversal is exhausted.
    pub fn next_token(&mut self, cursor: &str) -> AppResult<String> {
        let Some(current) = self.current_state.as_mut() else {
            return Err(AppError::Internal(
                "page bag has no current state".to_owned(),
            ));
        };

        if cursor.is_empty() {
            self.pop();
        } else {
            current.token = cursor.to_owned();
        }

        self.marshal()
    }
}

/// Decodes `token` for a traversal of `resource_type`.
///
/// An empty bag gets a fresh frame, so first and resumed calls look alike.
/// A token whose current frame belongs to another resource type, or to
/// another parent resource, is rejected.
pub fn parse_page_token(
    token: &str,
    resource_type: ResourceTypeId,
    resource_id: &str,
) -> AppResult<(PageBag, Option<String>)> {
    let mut bag = PageBag::unmarshal(token)?;

    match bag.current() {
        None => bag.push(PageState::new(resource_type, resource_id)),
        Some(state) if state.resource_type_id != resource_type => {
            return Err(AppError::PageTokenMismatch {
                expected: resource_type.as_str().to_owned(),
                found: state.resource_type_id.as_str().to_owned(),
            });
        }
        Some(state) if state.resource_id != resource_id => {
            return Err(AppError::PageTokenResourceMismatch {
                expected: resource_id.to_owned(),
                found: state.resource_id.clone(),
            });
        }
        Some(_) => {}
    }

    let cursor = bag.page_token().map(str::to_owned);
    Ok((bag, cursor))
}
