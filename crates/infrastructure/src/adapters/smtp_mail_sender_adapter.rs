//! SMTP mail sender adapter - Implements MailSenderPort using integration_mail

use application::{
    error::ApplicationError,
    ports::{MailSenderPort, OutgoingMail},
};
use async_trait::async_trait;
use integration_mail::{EmailAttachment, MailError, OutgoingEmail, SmtpConfig, SmtpSender};
use tracing::{debug, instrument};

/// Sends finished podcasts over SMTP
#[derive(Debug, Clone)]
pub struct SmtpMailSenderAdapter {
    sender: SmtpSender,
}

impl SmtpMailSenderAdapter {
    /// Create a new adapter with the given configuration
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self {
            sender: SmtpSender::new(config),
        }
    }

    /// Every SMTP failure is a delivery failure
    fn map_error(e: MailError) -> ApplicationError {
        ApplicationError::Delivery(e.to_string())
    }

    fn to_email(mail: OutgoingMail) -> OutgoingEmail {
        let email = OutgoingEmail::new(mail.to, mail.subject, mail.body);
        match mail.attachment {
            Some(attachment) => email.with_attachment(EmailAttachment {
                filename: attachment.filename,
                content_type: attachment.content_type,
                data: attachment.data,
            }),
            None => email,
        }
    }
}

#[async_trait]
impl MailSenderPort for SmtpMailSenderAdapter {
    #[instrument(skip(self, mail), fields(to = %mail.to))]
    async fn send(&self, mail: OutgoingMail) -> Result<(), ApplicationError> {
        let email = Self::to_email(mail);
        let message_id = self.sender.send(&email).await.map_err(Self::map_error)?;
        debug!(message_id = %message_id, "Podcast handed to SMTP server");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn verify(&self) -> Result<(), ApplicationError> {
        self.sender.verify().await.map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use application::ports::Attachment;

    use super::*;

    #[test]
    fn attachment_is_carried_over() {
        let email = SmtpMailSenderAdapter::to_email(OutgoingMail {
            to: "listener@example.com".to_string(),
            subject: "🎙️ Mando Minutes Podcast".to_string(),
            body: "Your podcast is ready.".to_string(),
            attachment: Some(Attachment {
                filename: "mando_20250707_073405.mp3".to_string(),
                content_type: "audio/mpeg".to_string(),
                data: vec![0xff, 0xfb, 0x90],
            }),
        });
        assert_eq!(email.to, "listener@example.com");
        let attachment = email.attachment.unwrap();
        assert_eq!(attachment.filename, "mando_20250707_073405.mp3");
        assert_eq!(attachment.data, vec![0xff, 0xfb, 0x90]);
    }

    #[test]
    fn auth_failure_is_delivery_failure() {
        let err = SmtpMailSenderAdapter::map_error(MailError::AuthenticationFailed("535".into()));
        assert!(matches!(err, ApplicationError::Delivery(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn unreachable_server_fails_delivery() {
        let adapter = SmtpMailSenderAdapter::new(SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 19_997,
            username: "reader@aol.com".to_string(),
            ..SmtpConfig::default()
        });
        let err = adapter
            .send(OutgoingMail {
                to: "listener@example.com".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
                attachment: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Delivery(_)));
    }
}
