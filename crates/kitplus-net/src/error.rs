//! Error types for network image loading.

use kitplus_core::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a status of 300 or above.
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("Response body is not an image: {0}")]
    Decode(#[from] DecodeError),
}
