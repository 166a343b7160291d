//! Speech adapter - Implements SpeechPort using ai_speech crate

use std::sync::Arc;

use ai_speech::{
    AudioFormat as AiAudioFormat, ElevenLabsProvider, SpeechConfig, SpeechError, TextToSpeech,
};
use application::error::ApplicationError;
use application::ports::{SpeechPort, SynthesisResult, VoiceSelection};
use async_trait::async_trait;
use domain::AudioFormat;
use tracing::{debug, instrument};

/// Adapter for speech synthesis using ai_speech crate
pub struct SpeechAdapter {
    provider: Arc<dyn TextToSpeech>,
}

impl std::fmt::Debug for SpeechAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechAdapter")
            .field("default_voice", &self.provider.default_voice())
            .field("configured", &self.provider.is_configured())
            .finish()
    }
}

impl SpeechAdapter {
    /// Create a new speech adapter backed by ElevenLabs
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to initialize.
    pub fn new(config: SpeechConfig) -> Result<Self, ApplicationError> {
        let provider = ElevenLabsProvider::new(config)
            .map_err(|e: SpeechError| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_provider(Arc::new(provider)))
    }

    /// Wrap an existing provider
    #[must_use]
    pub fn with_provider(provider: Arc<dyn TextToSpeech>) -> Self {
        Self { provider }
    }

    /// Convert ai_speech AudioFormat to domain AudioFormat
    const fn ai_to_domain_format(format: AiAudioFormat) -> AudioFormat {
        match format {
            AiAudioFormat::Mp3 => AudioFormat::Mp3,
            AiAudioFormat::Wav => AudioFormat::Wav,
            AiAudioFormat::Opus => AudioFormat::Opus,
        }
    }

    /// Map speech error to application error
    ///
    /// Nothing here is fatal: the pipeline carries on without audio.
    fn map_error(err: SpeechError) -> ApplicationError {
        match err {
            SpeechError::TextTooLong { chars, max } => ApplicationError::TextTooLong { chars, max },
            SpeechError::RateLimited => ApplicationError::RateLimited,
            SpeechError::ConnectionFailed(e) | SpeechError::RequestFailed(e) => {
                ApplicationError::ExternalService(e)
            },
            SpeechError::Timeout(ms) => {
                ApplicationError::ExternalService(format!("Speech service timeout after {ms}ms"))
            },
            other => ApplicationError::Speech(other.to_string()),
        }
    }

    /// Whether the service answers and accepts the key
    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }
}

#[async_trait]
impl SpeechPort for SpeechAdapter {
    #[instrument(skip(self, text), fields(text_len = text.len(), voice = ?voice.voice_id))]
    async fn synthesize(
        &self,
        text: String,
        voice: VoiceSelection,
    ) -> Result<SynthesisResult, ApplicationError> {
        let audio = self
            .provider
            .synthesize(&text, voice.voice_id.as_deref(), voice.model.as_deref())
            .await
            .map_err(Self::map_error)?;

        let format = Self::ai_to_domain_format(audio.format());
        debug!(bytes = audio.len(), format = %format, "Audio synthesized");

        Ok(SynthesisResult {
            audio_data: audio.into_data(),
            format,
        })
    }

    fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }
}
