//! Speech port - Interface for text-to-speech synthesis

use async_trait::async_trait;
use domain::AudioFormat;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of a speech synthesis operation
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Generated audio data
    pub audio_data: Vec<u8>,
    /// Format of the audio
    pub format: AudioFormat,
}

/// Voice overrides for one synthesis call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceSelection {
    /// Voice identifier, provider default when `None`
    pub voice_id: Option<String>,
    /// Model identifier, provider default when `None`
    pub model: Option<String>,
}

/// Port for speech synthesis
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechPort: Send + Sync {
    /// Synthesize speech from text
    ///
    /// Over-long text yields [`ApplicationError::TextTooLong`], which callers
    /// treat as an expected outcome.
    async fn synthesize(
        &self,
        text: String,
        voice: VoiceSelection,
    ) -> Result<SynthesisResult, ApplicationError>;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;
}
