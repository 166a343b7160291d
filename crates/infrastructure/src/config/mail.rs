//! Mailbox and delivery configuration: IMAP source, SMTP submission.

use application::{DEFAULT_BODY_TEMPLATE, DEFAULT_SUBJECT_TEMPLATE, DeliveryConfig};
use integration_mail::{ImapConfig, SmtpConfig, SmtpSecurity, TlsConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Mailbox the newsletters arrive in
#[derive(Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// IMAP server hostname
    #[serde(default = "default_imap_host")]
    pub imap_host: String,

    /// IMAP server port (implicit TLS)
    #[serde(default = "default_imap_port")]
    pub imap_port: u16,

    /// Login name, usually the full address
    #[serde(default)]
    pub username: String,

    /// App password (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,

    /// Folder searched for newsletters
    #[serde(default = "default_folder")]
    pub folder: String,

    /// TLS settings shared with SMTP
    #[serde(default)]
    pub tls: TlsConfig,
}

impl std::fmt::Debug for MailboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxConfig")
            .field("imap_host", &self.imap_host)
            .field("imap_port", &self.imap_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("folder", &self.folder)
            .field("tls", &self.tls)
            .finish()
    }
}

fn default_imap_host() -> String {
    "imap.aol.com".to_string()
}

const fn default_imap_port() -> u16 {
    993
}

fn default_folder() -> String {
    "INBOX".to_string()
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            imap_host: default_imap_host(),
            imap_port: default_imap_port(),
            username: String::new(),
            password: None,
            folder: default_folder(),
            tls: TlsConfig::default(),
        }
    }
}

impl MailboxConfig {
    /// Get the password as a string reference
    #[must_use]
    pub fn password_str(&self) -> Option<&str> {
        self.password
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|p| !p.is_empty())
    }

    /// Build the IMAP client configuration
    #[must_use]
    pub fn to_imap_config(&self) -> ImapConfig {
        ImapConfig {
            host: self.imap_host.clone(),
            port: self.imap_port,
            username: self.username.clone(),
            password: self.password_str().unwrap_or_default().to_string(),
            tls: self.tls.clone(),
        }
    }
}

/// Where and how finished podcasts are sent
#[derive(Clone, Serialize, Deserialize)]
pub struct DeliveryAppConfig {
    /// SMTP server hostname
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP port; 587 uses STARTTLS, 465 implicit TLS
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Explicit connection security, derived from the port when absent
    #[serde(default)]
    pub security: Option<SmtpSecurity>,

    /// Sending address, also the SMTP login
    #[serde(default)]
    pub sender_email: Option<String>,

    /// SMTP password; falls back to the mailbox password
    #[serde(default, skip_serializing)]
    pub sender_password: Option<SecretString>,

    /// Who receives the podcast
    #[serde(default)]
    pub recipient_email: Option<String>,

    /// Subject template (`{name}`, `{date}`)
    #[serde(default = "default_subject_template")]
    pub subject_template: String,

    /// Body template
    #[serde(default = "default_body_template")]
    pub body_template: String,
}

impl std::fmt::Debug for DeliveryAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryAppConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("security", &self.security)
            .field("sender_email", &self.sender_email)
            .field(
                "sender_password",
                &self.sender_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("recipient_email", &self.recipient_email)
            .finish_non_exhaustive()
    }
}

fn default_smtp_host() -> String {
    "smtp.aol.com".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_subject_template() -> String {
    DEFAULT_SUBJECT_TEMPLATE.to_string()
}

fn default_body_template() -> String {
    DEFAULT_BODY_TEMPLATE.to_string()
}

impl Default for DeliveryAppConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            security: None,
            sender_email: None,
            sender_password: None,
            recipient_email: None,
            subject_template: default_subject_template(),
            body_template: default_body_template(),
        }
    }
}

impl DeliveryAppConfig {
    fn non_empty(value: Option<&String>) -> Option<&str> {
        value.map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Sending address, if set
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        Self::non_empty(self.sender_email.as_ref())
    }

    /// Recipient address, if set
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        Self::non_empty(self.recipient_email.as_ref())
    }

    /// Build the SMTP client configuration; `None` without a sender address
    #[must_use]
    pub fn to_smtp_config(&self, mailbox: &MailboxConfig) -> Option<SmtpConfig> {
        let sender = self.sender()?;
        let password = self
            .sender_password
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|p| !p.is_empty())
            .or_else(|| mailbox.password_str())
            .unwrap_or_default();

        Some(SmtpConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: sender.to_string(),
            password: password.to_string(),
            security: self.security,
            tls: mailbox.tls.clone(),
        })
    }

    /// Build the composer configuration; `None` without a recipient
    #[must_use]
    pub fn to_delivery_config(&self) -> Option<DeliveryConfig> {
        Some(DeliveryConfig {
            recipient: self.recipient()?.to_string(),
            subject_template: self.subject_template.clone(),
            body_template: self.body_template.clone(),
        })
    }
}
