//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Mailbox connection or authentication refused
    #[error("Mailbox connection failed: {0}")]
    Transport(String),

    /// Mailbox protocol error after a session was established
    #[error("Mailbox error: {0}")]
    Mailbox(String),

    /// Outbound mail submission failed
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Remote script generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Speech synthesis failed
    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    /// Script exceeds what the speech service accepts in one request
    #[error("Text too long for speech synthesis: {chars} characters (max {max})")]
    TextTooLong {
        /// Characters in the rejected text
        chars: usize,
        /// Service limit
        max: usize,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Writing an output artifact failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether this error ends the current run
    ///
    /// Mailbox transport and delivery failures are fatal; failures of the
    /// speech and generation services are absorbed by degraded strategies.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Mailbox(_)
                | Self::Delivery(_)
                | Self::Storage(_)
                | Self::Configuration(_)
                | Self::Domain(_)
                | Self::Internal(_)
        )
    }

    /// Whether this is a failure mode callers should treat as routine
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::TextTooLong { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_delivery_are_fatal() {
        assert!(ApplicationError::Transport("refused".into()).is_fatal());
        assert!(ApplicationError::Delivery("550".into()).is_fatal());
        assert!(ApplicationError::Storage("disk full".into()).is_fatal());
    }

    #[test]
    fn external_api_failures_are_not_fatal() {
        assert!(!ApplicationError::RateLimited.is_fatal());
        assert!(!ApplicationError::Speech("500".into()).is_fatal());
        assert!(!ApplicationError::Inference("quota".into()).is_fatal());
        assert!(!ApplicationError::TextTooLong { chars: 9000, max: 5000 }.is_fatal());
    }

    #[test]
    fn text_too_long_is_expected() {
        assert!(ApplicationError::TextTooLong { chars: 9000, max: 5000 }.is_expected());
        assert!(!ApplicationError::RateLimited.is_expected());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ApplicationError::TextTooLong { chars: 9000, max: 5000 }.to_string(),
            "Text too long for speech synthesis: 9000 characters (max 5000)"
        );
        assert_eq!(
            ApplicationError::Transport("auth refused".into()).to_string(),
            "Mailbox connection failed: auth refused"
        );
    }

    #[test]
    fn domain_error_converts() {
        let err: ApplicationError = DomainError::InvalidEmailAddress("x".into()).into();
        assert_eq!(err.to_string(), "Invalid email address: x");
        assert!(err.is_fatal());
    }
}
