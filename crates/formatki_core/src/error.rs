//! Error types for remote calls, local validation, and storage.
use thiserror::Error;

/// Failure talking to the remote catalog or generation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The request never produced an HTTP response.
    #[error("Connection error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was missing or not the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Reasons the form cannot be submitted yet.
///
/// The display text is what the user sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Choose a category")]
    MissingCategory,

    #[error("Choose GT and KW")]
    MissingSelection,

    #[error("Enter a valid email address")]
    InvalidEmail,
}

/// Remembered-email storage failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_renders_code_and_message() {
        let err = CatalogError::Status {
            status: 500,
            message: "Plik nie znaleziony".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: Plik nie znaleziony");
    }

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::MissingCategory.to_string(),
            "Choose a category"
        );
        assert_eq!(
            ValidationError::MissingSelection.to_string(),
            "Choose GT and KW"
        );
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Enter a valid email address"
        );
    }
}
