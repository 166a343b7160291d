//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer on top of the IMAP,
//! SMTP, speech, inference and article clients, loads configuration and
//! installs logging.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::{build_extractor, build_mail_sender, build_pipeline, build_script_builder};
pub use config::{
    AppConfig, ArticlesAppConfig, ConfigError, DeliveryAppConfig, InferenceAppConfig, LogFormat,
    LoggingConfig, MailboxConfig, NewsletterConfig, OutputConfig, PipelineAppConfig,
    SpeechAppConfig,
};
pub use telemetry::{TelemetryError, init_logging, resolve_filter, verbosity_filter};
