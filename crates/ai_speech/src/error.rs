//! Speech synthesis errors

use thiserror::Error;

/// Errors that can occur during speech synthesis
#[derive(Debug, Error)]
pub enum SpeechError {
    /// No usable API key
    #[error("Speech API key not configured")]
    NotConfigured,

    /// Failed to connect to speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to speech service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Text exceeds the single-request limit
    #[error("Text too long: {chars} characters exceeds maximum of {max}")]
    TextTooLong {
        /// Characters in the text
        chars: usize,
        /// Configured maximum
        max: usize,
    },

    /// Key rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Character quota for the account is used up
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Synthesis failed
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Invalid response from service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during processing
    #[error("Speech processing timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Voice not found
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),
}

impl SpeechError {
    /// Map a transport-level failure, reporting timeouts with the configured budget
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
