//! Error types for food search and manual entry.

use std::fmt;

use thiserror::Error;

/// Shown when the provider answered but matched nothing.
pub const NO_RESULTS_MESSAGE: &str = "No products found for your search.";
/// Shown for every transport, status, or payload failure.
pub const FETCH_ERROR_MESSAGE: &str = "An error occurred while fetching data.";

/// Failures of a single food search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The provider returned a non-success status code.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    /// The response body did not match the provider's schema.
    #[error("failed to parse response: {0}")]
    Malformed(String),
    /// The request succeeded but matched zero records. The search controller
    /// raises this for an empty result list; providers may also return it.
    #[error("no results")]
    NoResults,
}

impl SearchError {
    /// Message to present to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            SearchError::NoResults => NO_RESULTS_MESSAGE,
            _ => FETCH_ERROR_MESSAGE,
        }
    }
}

/// A single invalid form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field path, e.g. `calories` or `vitamins[0].amount`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Failures while editing or submitting a manual food entry.
#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("no vitamin row at index {index} (rows: {len})")]
    VitaminIndex { index: usize, len: usize },
    #[error("unknown unit `{0}`, expected one of mg, mcg, g")]
    UnknownUnit(String),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages() {
        assert_eq!(SearchError::NoResults.user_message(), NO_RESULTS_MESSAGE);
        assert_eq!(
            SearchError::Malformed("eof".into()).user_message(),
            FETCH_ERROR_MESSAGE
        );
        assert_eq!(
            SearchError::UnexpectedStatus {
                status: 503,
                body: String::new()
            }
            .user_message(),
            FETCH_ERROR_MESSAGE
        );
    }

    #[test]
    fn validation_display_counts_fields() {
        let err = EntryError::Validation(vec![
            FieldError::new("name", "is required"),
            FieldError::new("fat", "must be a number"),
        ]);
        assert_eq!(err.to_string(), "2 field(s) failed validation");
        assert_eq!(
            FieldError::new("fat", "must be a number").to_string(),
            "fat: must be a number"
        );
    }
}
