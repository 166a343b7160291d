//! Mail sender port - Interface for delivering finished podcasts

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// A file attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient
    pub filename: String,
    /// MIME type, e.g. `audio/mpeg`
    pub content_type: String,
    /// Raw file bytes
    pub data: Vec<u8>,
}

/// A message with one text part and optionally one attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Optional attachment
    pub attachment: Option<Attachment>,
}

/// Port for outbound mail submission
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailSenderPort: Send + Sync {
    /// Submit a message
    ///
    /// Failures are reported as [`ApplicationError::Delivery`].
    async fn send(&self, mail: OutgoingMail) -> Result<(), ApplicationError>;

    /// Connect and authenticate without sending anything
    async fn verify(&self) -> Result<(), ApplicationError>;
}
