//! # Error Types Module
//!
//! This module defines the error taxonomy shared by ingredient extraction,
//! recipe generation, the retry wrapper and the history store.
//!
//! Only [`RecipeError::TransientServiceUnavailable`] is ever retried. Every
//! other kind is terminal for the operation that raised it.

use thiserror::Error;

/// Fluent key shown when no credential is configured
pub const MESSAGE_KEY_MISSING_CREDENTIAL: &str = "error-missing-credential";
/// Fluent key shown for every other failure
pub const MESSAGE_KEY_GENERIC: &str = "error-generic";

/// Errors raised by the recipe assistant
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecipeError {
    /// No usable service credential could be resolved from configuration
    #[error("no API key configured (set GEMINI_API_KEY, GOOGLE_API_KEY or API_KEY)")]
    MissingCredential,

    /// The service signalled a temporary overload (HTTP 503 / UNAVAILABLE)
    #[error("service temporarily unavailable ({status}): {message}")]
    TransientServiceUnavailable { status: u16, message: String },

    /// The service answered, but the body does not match the declared shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Any other rejection from the service or the transport
    #[error("service error ({status}): {message}")]
    ServiceError { status: u16, message: String },

    /// Caller input violated a local contract (image count, unreadable file)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// History persistence failed
    #[error("storage error: {0}")]
    Storage(String),
}

impl RecipeError {
    /// Whether the retry wrapper may try the failed call again
    pub fn is_transient(&self) -> bool {
        matches!(self, RecipeError::TransientServiceUnavailable { .. })
    }

    /// Localization key the front end should display for this failure.
    ///
    /// Missing credentials get a configuration-fix prompt, everything else
    /// maps to the generic "try again" message.
    pub fn user_message_key(&self) -> &'static str {
        match self {
            RecipeError::MissingCredential => MESSAGE_KEY_MISSING_CREDENTIAL,
            _ => MESSAGE_KEY_GENERIC,
        }
    }
}

impl From<std::io::Error> for RecipeError {
    fn from(err: std::io::Error) -> Self {
        RecipeError::Storage(err.to_string())
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, RecipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_overload_is_transient() {
        let transient = RecipeError::TransientServiceUnavailable {
            status: 503,
            message: "The model is overloaded".to_string(),
        };
        assert!(transient.is_transient());

        assert!(!RecipeError::MissingCredential.is_transient());
        assert!(!RecipeError::MalformedResponse("x".to_string()).is_transient());
        assert!(!RecipeError::ServiceError {
            status: 400,
            message: "API key not valid".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_user_message_mapping() {
        assert_eq!(
            RecipeError::MissingCredential.user_message_key(),
            MESSAGE_KEY_MISSING_CREDENTIAL
        );
        assert_eq!(
            RecipeError::MalformedResponse("bad".to_string()).user_message_key(),
            MESSAGE_KEY_GENERIC
        );
        assert_eq!(
            RecipeError::Storage("disk full".to_string()).user_message_key(),
            MESSAGE_KEY_GENERIC
        );
    }
}
