//! Values that carry state from one step of a run to the next.
//!
//! Both types can only be built from non-empty strings, so the profile
//! update can never be sent without a token or a file reference.

use std::fmt;

/// Authentication state captured by the login step.
///
/// Owned by a single run: the login step returns it and the profile step
/// consumes it. Nothing keeps it alive between runs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionState {
    auth_token: String,
    cookie_header: String,
}

impl SessionState {
    /// Returns `None` when the token is empty.
    pub fn new(auth_token: impl Into<String>, cookie_header: impl Into<String>) -> Option<Self> {
        let auth_token = auth_token.into();
        if auth_token.trim().is_empty() {
            return None;
        }
        Some(Self {
            auth_token,
            cookie_header: cookie_header.into(),
        })
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn cookie_header(&self) -> &str {
        &self.cookie_header
    }

    /// Short, non-reversible preview of the token for log lines.
    pub fn token_preview(&self) -> String {
        mask_token(&self.auth_token)
    }
}

// Tokens must never reach logs through `{:?}`.
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("auth_token", &self.token_preview())
            .field("cookie_header_len", &self.cookie_header.len())
            .finish()
    }
}

/// Where the upload step found the file reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// `body[<fileKey>].fileKey`
    Nested,
    /// `body.fileKey`
    TopLevel,
    /// The configured file key, used because the response carried none.
    ConfiguredFallback,
}

impl fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceSource::Nested => "nested",
            ReferenceSource::TopLevel => "top-level",
            ReferenceSource::ConfiguredFallback => "configured fallback",
        };
        f.write_str(name)
    }
}

/// Opaque identifier of the uploaded document on the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileReference(String);

impl RemoteFileReference {
    /// Returns `None` for empty or whitespace-only references.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteFileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const PREVIEW_CHARS: usize = 8;

fn mask_token(token: &str) -> String {
    let total = token.chars().count();
    let head: String = token.chars().take(PREVIEW_CHARS).collect();
    format!("{head}… ({total} chars)")
}
