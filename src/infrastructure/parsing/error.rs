//! Parsing error types
//!
//! Item-level failures are reported as [`ExtractionSkip`]s and never abort
//! a page; only an unusable selector configuration is fatal.

use thiserror::Error;

use crate::domain::errors::RecordError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Required field '{field}' not found in item")]
    RequiredFieldMissing { field: &'static str },

    #[error("Invalid price '{value}': {reason}")]
    InvalidPrice { value: String, reason: String },

    #[error("Item payload could not be decoded: {reason}")]
    PayloadDecodeFailed { reason: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ParsingError {
    pub fn required_field_missing(field: &'static str) -> Self {
        Self::RequiredFieldMissing { field }
    }

    pub fn payload_decode_failed(reason: impl Into<String>) -> Self {
        Self::PayloadDecodeFailed { reason: reason.into() }
    }

    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<RecordError> for ParsingError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::EmptyField { field } => Self::RequiredFieldMissing { field },
            RecordError::InvalidPrice { value, reason } => Self::InvalidPrice { value, reason },
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;

/// One item container that was skipped during extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSkip {
    /// Position of the container on its page
    pub index: usize,
    pub reason: ParsingError,
}
