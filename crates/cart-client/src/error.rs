//! Cart client errors.

use thiserror::Error;

/// Errors that can occur when talking to the cart API.
///
/// Every variant has already been handled locally (logged, or shown to the
/// shopper for [`CartError::MissingCredential`]) by the time the caller sees
/// it. The value exists so the embedding can tell how the call ended.
#[derive(Debug, Error)]
pub enum CartError {
    /// Session storage holds no access token.
    #[error("No access token in session storage")]
    MissingCredential,

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Cart request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Cart API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Cart response error: {0}")]
    Decode(String),

    /// The cart endpoint URL could not be built from the base URL.
    #[error("Invalid cart endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CartError {
    /// Whether the shopper must sign in again before retrying.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }
}
