//! AI Speech - Text-to-Speech for podcast audio
//!
//! Provides the `TextToSpeech` port and an ElevenLabs adapter:
//! - `ports` module defines the trait (port)
//! - `providers` module contains concrete implementations (adapters)
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{ElevenLabsProvider, SpeechConfig, TextToSpeech};
//!
//! let provider = ElevenLabsProvider::new(config)?;
//! let audio = provider.synthesize("Good morning!", None, None).await?;
//! std::fs::write("episode.mp3", audio.data())?;
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::{SpeechConfig, VoiceSettings, is_placeholder_key};
pub use error::SpeechError;
pub use ports::TextToSpeech;
pub use providers::elevenlabs::ElevenLabsProvider;
pub use types::{AudioData, AudioFormat};
