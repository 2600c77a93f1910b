use miette::{Diagnostic, Result};
use rust_i18n::t;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(shiftpick::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(shiftpick::config))]
    Config(String),

    #[error("Catalog fetch error: {0}")]
    #[diagnostic(code(shiftpick::catalog_fetch))]
    CatalogFetch(String),

    #[error("Submit error: {0}")]
    #[diagnostic(code(shiftpick::submit))]
    Submit(String),

    #[error("Session error: {0}")]
    #[diagnostic(code(shiftpick::session))]
    Session(String),

    #[error("Slot is not offered for this department: {0}")]
    #[diagnostic(code(shiftpick::unknown_slot))]
    UnknownSlot(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("Other error: {0}")]
    #[diagnostic(code(shiftpick::other))]
    Other(String),
}

/// Rule violations surfaced to whoever is editing a selection
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("no time slot selected")]
    #[diagnostic(code(shiftpick::validation::empty))]
    Empty,

    #[error("shift {slot} is shorter than one hour")]
    #[diagnostic(code(shiftpick::validation::duration_too_short))]
    DurationTooShort { slot: String },

    #[error("shift {candidate} overlaps {existing}")]
    #[diagnostic(
        code(shiftpick::validation::overlap),
        help("back-to-back shifts are allowed when one ends exactly when the other starts")
    )]
    Overlap { candidate: String, existing: String },
}

impl ValidationError {
    /// Localized message for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::Empty => t!("validation.empty").to_string(),
            ValidationError::DurationTooShort { slot } => {
                t!("validation.duration_too_short", slot = slot).to_string()
            }
            ValidationError::Overlap { candidate, existing } => {
                t!("validation.overlap", candidate = candidate, existing = existing).to_string()
            }
        }
    }
}

/// Type alias for Result with our Error type
pub type SlotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create catalog fetch errors
pub fn catalog_error(message: &str) -> Error {
    Error::CatalogFetch(message.to_string())
}

/// Helper to create submit errors
pub fn submit_error(message: &str) -> Error {
    Error::Submit(message.to_string())
}

/// Helper to create session errors
pub fn session_error(message: &str) -> Error {
    Error::Session(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_converts_into_error() {
        let err: Error = ValidationError::Empty.into();
        assert!(matches!(err, Error::Validation(ValidationError::Empty)));
    }

    #[test]
    fn test_user_message_mentions_slot() {
        let err = ValidationError::DurationTooShort {
            slot: "9:00 AM - 9:30 AM".to_string(),
        };
        assert!(err.user_message().contains("9:00 AM - 9:30 AM"));
    }
}
