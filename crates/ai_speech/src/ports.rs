//! Port definitions for speech synthesis
//!
//! Adapters implementing [`TextToSpeech`] turn finished podcast scripts into
//! audio.

use async_trait::async_trait;

use crate::{error::SpeechError, types::AudioData};

/// Port for Text-to-Speech synthesis
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize text into audio
    ///
    /// `voice` and `model` fall back to the configured defaults when `None`.
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        model: Option<&str>,
    ) -> Result<AudioData, SpeechError>;

    /// Check if the service is reachable with the configured key
    async fn is_available(&self) -> bool;

    /// Whether a usable API key is present
    fn is_configured(&self) -> bool;

    /// Voice used when none is given
    fn default_voice(&self) -> &str;

    /// Model used when none is given
    fn model_name(&self) -> &str;
}
