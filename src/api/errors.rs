//! Error types for the Stellar API gateway.
//!
//! Every gateway failure is normalized into one [`ApiError`] variant so the
//! store can decide uniformly what to roll back, what to surface, and what
//! to suppress (cancelled requests during rapid navigation).

use crate::model::ReservaId;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, connect, TLS, timeout.
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The request was aborted before completion (navigation, shutdown).
    #[error("request cancelled")]
    Cancelled,

    /// The server rejected the request as invalid (HTTP 400/422).
    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("reservation {id} not found")]
    NotFound { id: ReservaId },

    /// Any other non-success status.
    #[error("server error (status {status})")]
    Server { status: u16, message: Option<String> },

    /// The response body did not match the expected shape.
    #[error("malformed response from {url}: {detail}")]
    Malformed { url: String, detail: String },
}

impl ApiError {
    /// Message to show the user: the server-supplied one when present,
    /// otherwise the caller's generic fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation { message } => message.clone(),
            ApiError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_owned(),
        }
    }

    /// Cancelled requests are expected during rapid navigation and are not
    /// surfaced to the user.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err)
    }
}
