//! Application configuration
//!
//! Split into focused sub-modules by concern:
//! - `mail`: IMAP mailbox and SMTP delivery
//! - `services`: script generation, speech, article fetching
//! - `pipeline`: pipeline behavior and newsletter profiles
//!
//! Loaded once at startup: built-in defaults, then an optional TOML file,
//! then `NEWSCAST_`-prefixed environment variables using `__` between
//! section and key (`NEWSCAST_MAILBOX__PASSWORD`).

mod mail;
mod pipeline;
mod services;

use std::path::{Path, PathBuf};

use domain::NewsletterProfile;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use mail::{DeliveryAppConfig, MailboxConfig};
pub use pipeline::{NewsletterConfig, PipelineAppConfig};
pub use services::{ArticlesAppConfig, InferenceAppConfig, SpeechAppConfig};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "NEWSCAST";

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or values could not be deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Required values are missing
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// A requested newsletter profile does not exist
    #[error("Unknown newsletter profile: {0}")]
    UnknownProfile(String),
}

/// Where artifacts are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Flat output directory for scripts, audio and article dumps
    #[serde(default = "default_podcast_dir")]
    pub podcast_dir: PathBuf,
}

fn default_podcast_dir() -> PathBuf {
    PathBuf::from("podcasts")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            podcast_dir: default_podcast_dir(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (e.g. `info`, `newscast=debug`); `RUST_LOG` wins
    #[serde(default)]
    pub level: Option<String>,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mailbox the newsletters arrive in
    #[serde(default)]
    pub mailbox: MailboxConfig,

    /// Podcast delivery by mail
    #[serde(default)]
    pub delivery: DeliveryAppConfig,

    /// Remote script generation
    #[serde(default)]
    pub inference: InferenceAppConfig,

    /// Speech synthesis
    #[serde(default)]
    pub speech: SpeechAppConfig,

    /// Linked-article fetching
    #[serde(default)]
    pub articles: ArticlesAppConfig,

    /// Pipeline behavior
    #[serde(default)]
    pub pipeline: PipelineAppConfig,

    /// Artifact output
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Newsletter profiles, in processing order
    #[serde(default)]
    pub newsletters: Vec<NewsletterConfig>,
}

impl AppConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// An explicit `path` must exist; without one, `config.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(Self::environment())
            .build()?;
        let loaded: Self = config.try_deserialize()?;

        debug!(
            newsletters = loaded.newsletters.len(),
            podcast_dir = %loaded.output.podcast_dir.display(),
            "Configuration loaded"
        );
        Ok(loaded)
    }

    /// Parse configuration from a TOML document without consulting the environment
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Presence checks for a full run including delivery
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_for(true)
    }

    /// Presence checks; delivery settings are only required when `deliver` is set
    ///
    /// Every problem is reported at once.
    pub fn validate_for(&self, deliver: bool) -> Result<(), ConfigError> {
        let problems = self.problems(deliver);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    fn problems(&self, deliver: bool) -> Vec<String> {
        let mut problems = Vec::new();

        if self.mailbox.imap_host.trim().is_empty() {
            problems.push("mailbox.imap_host is required".to_string());
        }
        if self.mailbox.username.trim().is_empty() {
            problems.push("mailbox.username is required".to_string());
        }
        if self.mailbox.password_str().is_none() {
            problems.push("mailbox.password is required".to_string());
        }

        if deliver {
            if self.delivery.sender().is_none() {
                problems.push("delivery.sender_email is required".to_string());
            }
            if self.delivery.recipient().is_none() {
                problems.push("delivery.recipient_email is required".to_string());
            }
        }

        if self.newsletters.is_empty() {
            problems.push("at least one [[newsletters]] entry is required".to_string());
        }
        let mut seen = Vec::new();
        for newsletter in &self.newsletters {
            if let Err(e) = newsletter.to_profile().validate() {
                problems.push(e.to_string());
            }
            let name = newsletter.name.trim();
            if seen.contains(&name) {
                problems.push(format!("newsletter '{name}' is defined twice"));
            }
            seen.push(name);
        }

        problems
    }

    /// Look up a newsletter profile by name (case-insensitive)
    #[must_use]
    pub fn newsletter(&self, name: &str) -> Option<&NewsletterConfig> {
        let name = name.trim();
        self.newsletters
            .iter()
            .find(|n| n.name.trim().eq_ignore_ascii_case(name))
    }

    /// Enabled profiles in configuration order
    #[must_use]
    pub fn enabled_profiles(&self) -> Vec<NewsletterProfile> {
        self.newsletters
            .iter()
            .filter(|n| n.enabled)
            .map(NewsletterConfig::to_profile)
            .collect()
    }

    /// Profiles named on the command line, in the order given
    ///
    /// Explicitly named profiles run even when disabled.
    pub fn select_profiles(&self, names: &[String]) -> Result<Vec<NewsletterProfile>, ConfigError> {
        names
            .iter()
            .map(|name| {
                self.newsletter(name)
                    .map(NewsletterConfig::to_profile)
                    .ok_or_else(|| ConfigError::UnknownProfile(name.clone()))
            })
            .collect()
    }
}
