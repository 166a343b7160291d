//! Connection settings for the IMAP and SMTP clients

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// TLS configuration shared by IMAP and SMTP connections
///
/// Certificate verification is on unless explicitly disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether to verify TLS certificates
    ///
    /// `None` is treated as `true`.
    #[serde(default)]
    pub verify_certificates: Option<bool>,

    /// Path to a custom CA certificate file (PEM format)
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,

    /// Minimum TLS version to accept
    #[serde(default = "default_min_tls_version")]
    pub min_tls_version: String,
}

fn default_min_tls_version() -> String {
    "1.2".to_string()
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify_certificates: None,
            ca_cert_path: None,
            min_tls_version: default_min_tls_version(),
        }
    }
}

impl TlsConfig {
    /// Check if TLS certificate verification is enabled
    #[must_use]
    pub fn should_verify(&self) -> bool {
        self.verify_certificates.unwrap_or(true)
    }

    /// Accept self-signed certificates
    ///
    /// Only for local test servers and relays.
    #[must_use]
    pub fn insecure() -> Self {
        warn!("⚠️ TLS certificate verification disabled");
        Self {
            verify_certificates: Some(false),
            ..Self::default()
        }
    }

    /// Verify against a custom CA certificate
    pub fn with_ca_cert(ca_cert_path: impl Into<PathBuf>) -> Self {
        Self {
            verify_certificates: Some(true),
            ca_cert_path: Some(ca_cert_path.into()),
            ..Self::default()
        }
    }
}

/// IMAP account settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ImapConfig {
    /// Server host
    pub host: String,
    /// Server port (implicit TLS)
    pub port: u16,
    /// Login name, usually the full address
    pub username: String,
    /// Password or app password
    #[serde(skip_serializing)]
    pub password: String,
    /// TLS settings
    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for ImapConfig {
    fn default() -> Self {
        Self {
            host: "imap.aol.com".to_string(),
            port: 993,
            username: String::new(),
            password: String::new(),
            tls: TlsConfig::default(),
        }
    }
}

impl fmt::Debug for ImapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("tls", &self.tls)
            .finish()
    }
}

impl ImapConfig {
    /// `host:port`
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with `STARTTLS`
    StartTls,
    /// TLS from the first byte
    ImplicitTls,
    /// No encryption; local relays only
    Plain,
}

impl SmtpSecurity {
    /// Port 465 implies implicit TLS, anything else STARTTLS
    #[must_use]
    pub const fn for_port(port: u16) -> Self {
        if port == 465 {
            Self::ImplicitTls
        } else {
            Self::StartTls
        }
    }
}

/// SMTP submission settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login name, also used as the `From` address
    pub username: String,
    /// Password or app password
    #[serde(skip_serializing)]
    pub password: String,
    /// Connection security; derived from the port when absent
    #[serde(default)]
    pub security: Option<SmtpSecurity>,
    /// TLS settings
    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.aol.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            security: None,
            tls: TlsConfig::default(),
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("security", &self.security())
            .field("tls", &self.tls)
            .finish()
    }
}

impl SmtpConfig {
    /// Effective connection security
    #[must_use]
    pub fn security(&self) -> SmtpSecurity {
        self.security
            .unwrap_or_else(|| SmtpSecurity::for_port(self.port))
    }

    /// `host:port`
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
