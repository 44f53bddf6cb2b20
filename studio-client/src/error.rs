//! Error types for the Studio client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Studio client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Access token rejected and no way to log in again
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not enough credits for the request (402)
    #[error("Insufficient credits: {0}")]
    InsufficientCredits(String),

    /// Too many requests (429)
    #[error("Rate limited by the API")]
    RateLimited,

    /// Asset exists but is not ready for download (409)
    #[error("Asset not ready")]
    NotReady,

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// No credentials available for an authenticated call
    #[error("Not logged in: no credentials available")]
    MissingCredentials,

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an error from a non-success status code and response body
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized(message),
            402 => Self::InsufficientCredits(message),
            404 => Self::NotFound(message),
            409 => Self::NotReady,
            429 => Self::RateLimited,
            _ => Self::ApiError { status, message },
        }
    }

    /// HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::InsufficientCredits(_) => Some(402),
            Self::NotFound(_) => Some(404),
            Self::NotReady => Some(409),
            Self::RateLimited => Some(429),
            Self::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Gateway errors the API produces while overloaded
    pub fn is_gateway_error(&self) -> bool {
        matches!(self, Self::ApiError { status: 502..=504, .. })
    }

    /// Check if retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::RateLimited | Self::NotReady | Self::ParseError(_) => {
                true
            }
            other => other.is_server_error(),
        }
    }
}
