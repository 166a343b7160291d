//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_address_names_input() {
        let err = DomainError::InvalidEmailAddress("mandominutes".to_string());
        assert_eq!(err.to_string(), "Invalid email address: mandominutes");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("sender set is empty".to_string());
        assert_eq!(err.to_string(), "Validation failed: sender set is empty");
    }
}
