//! Mail integration for newscast
//!
//! - [`ImapMailbox`] / [`ImapConnection`]: read newsletters over IMAP
//! - [`SmtpSender`]: submit finished podcasts over SMTP
//! - [`parse_message`]: RFC 822 bytes into a [`domain::MailMessage`]
//!
//! ## Requirements
//!
//! AOL and most large providers need an app password for IMAP and SMTP.
//! Defaults are `imap.aol.com:993` (implicit TLS) and `smtp.aol.com:587`
//! (STARTTLS).

pub mod config;
pub mod error;
pub mod imap_client;
pub mod imap_query;
pub mod message_parser;
pub mod smtp_client;
pub mod tls;

pub use config::{ImapConfig, SmtpConfig, SmtpSecurity, TlsConfig};
pub use error::MailError;
pub use imap_client::{ImapConnection, ImapMailbox};
pub use imap_query::SearchCriteria;
pub use message_parser::{parse_date, parse_message};
pub use smtp_client::{EmailAttachment, OutgoingEmail, SmtpSender};
