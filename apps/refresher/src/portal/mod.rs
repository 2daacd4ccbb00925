//! Portal transport: the only code that talks HTTP to the job portal.
//!
//! `PortalTransport` is the seam between the update steps and the network.
//! It returns raw `PortalResponse`s; token extraction, reference resolution
//! and status policy live in `crate::refresh`, so they can be driven by a
//! scripted transport in tests.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::refresh::SessionState;

pub mod client;
pub mod cookies;
pub mod headers;
pub mod models;

pub use client::PortalClient;
pub use models::{LoginRequest, LoginResponse, ProfileUpdateRequest};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Raw reply from the portal. Non-2xx statuses are returned, not raised.
#[derive(Debug, Clone, Default)]
pub struct PortalResponse {
    pub status: u16,
    /// Every `set-cookie` header value, in the order received.
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Multipart payload for the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub form_key: String,
    pub file_key: String,
    pub file_name: String,
    pub content: Bytes,
}

#[async_trait]
pub trait PortalTransport: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<PortalResponse, TransportError>;

    /// Unauthenticated; the portal correlates the upload through the form keys.
    async fn upload(&self, form: UploadForm) -> Result<PortalResponse, TransportError>;

    async fn update_profile(
        &self,
        session: &SessionState,
        request: &ProfileUpdateRequest,
    ) -> Result<PortalResponse, TransportError>;
}
