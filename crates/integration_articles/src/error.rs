//! Article fetching errors

use thiserror::Error;

/// Errors that can occur while fetching an article
#[derive(Debug, Error)]
pub enum ArticleError {
    /// URL could not be parsed or is not http(s)
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection to the site failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response is not an HTML page
    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    /// Page had no readable text
    #[error("No readable content at {0}")]
    NoContent(String),

    /// Request timeout
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout in milliseconds
        timeout_ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ArticleError {
    /// Map a transport-level failure
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_ms }
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ArticleError::HttpStatus {
            status: 404,
            url: "https://example.com/a".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://example.com/a");
        assert_eq!(
            ArticleError::Timeout { timeout_ms: 10_000 }.to_string(),
            "Request timed out after 10000ms"
        );
    }
}
