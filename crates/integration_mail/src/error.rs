//! Mail integration errors

use thiserror::Error;

/// Errors from the IMAP and SMTP clients
#[derive(Debug, Error)]
pub enum MailError {
    /// Network or TLS failure
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Server rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Requested folder does not exist
    #[error("Mailbox not found: {0}")]
    MailboxNotFound(String),

    /// Requested message does not exist
    #[error("Message not found: {0}")]
    MessageNotFound(u32),

    /// IMAP command failed
    #[error("IMAP error: {0}")]
    ImapError(String),

    /// SMTP command failed
    #[error("SMTP error: {0}")]
    SmtpError(String),

    /// Raw message could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation attempted on a closed session
    #[error("Session closed")]
    SessionClosed,

    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

impl MailError {
    /// Whether the failure happened before or during login
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::AuthenticationFailed(_)
        )
    }
}

impl From<mailparse::MailParseError> for MailError {
    fn from(err: mailparse::MailParseError) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_classification() {
        assert!(MailError::ConnectionFailed("refused".into()).is_transport());
        assert!(MailError::AuthenticationFailed("bad password".into()).is_transport());
        assert!(!MailError::MessageNotFound(7).is_transport());
        assert!(!MailError::SmtpError("550".into()).is_transport());
    }

    #[test]
    fn message_not_found_display() {
        assert_eq!(
            MailError::MessageNotFound(42).to_string(),
            "Message not found: 42"
        );
    }
}
