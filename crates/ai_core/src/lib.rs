//! AI Core - Remote script generation
//!
//! Provides an inference abstraction over OpenAI-compatible chat completion
//! APIs. Missing or placeholder API keys leave the engine unconfigured so the
//! caller can fall back to local script building.

pub mod config;
pub mod error;
pub mod openai;
pub mod ports;

pub use config::{InferenceConfig, is_placeholder_key};
pub use error::InferenceError;
pub use openai::OpenAiInferenceEngine;
pub use ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage};
