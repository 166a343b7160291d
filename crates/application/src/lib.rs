//! Application layer - Use cases and orchestration
//!
//! Port definitions for the mailbox, speech, inference, article and artifact
//! adapters, and the services that drive a newsletter through the pipeline.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
