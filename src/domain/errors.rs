//! Domain error types
//!
//! Errors that cross the seams between the price watch core and its
//! collaborators (page fetching, record validation, notification delivery).

use thiserror::Error;

/// Failure to retrieve one listing page. Always fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("HTTP request failed with status {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// URL of the request that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Connection { url, .. }
            | Self::Status { url, .. }
            | Self::Body { url, .. } => url,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A record that violates the Record invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Record field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("Invalid price '{value}': {reason}")]
    InvalidPrice { value: String, reason: String },
}

/// Failure reported by a notification channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification channel '{channel}' failed: {message}")]
    Delivery { channel: String, message: String },
}
