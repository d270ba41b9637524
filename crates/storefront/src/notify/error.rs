//! Notification dispatch errors.

use thiserror::Error;

/// Errors that can occur when dispatching an abandonment notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Endpoint accepted the request but reported failure in the body.
    #[error("Dispatch rejected: {0}")]
    Rejected(String),

    /// Client could not be built from configuration.
    #[error("Notifier configuration error: {0}")]
    Config(String),
}
