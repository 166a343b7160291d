//! ElevenLabs text-to-speech provider

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::{SpeechConfig, VoiceSettings},
    error::SpeechError,
    ports::TextToSpeech,
    types::{AudioData, AudioFormat},
};

/// Text-to-speech adapter for the ElevenLabs API
pub struct ElevenLabsProvider {
    client: Client,
    config: SpeechConfig,
}

impl std::fmt::Debug for ElevenLabsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

impl ElevenLabsProvider {
    /// Create a new provider
    ///
    /// Succeeds without an API key; synthesis then fails with
    /// [`SpeechError::NotConfigured`].
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SpeechError::ConnectionFailed(e.to_string()))?;

        if config.is_configured() {
            info!(
                voice = %config.default_voice,
                model = %config.model,
                "🔊 ElevenLabs speech synthesis enabled"
            );
        } else {
            debug!("Speech API key missing or placeholder, audio generation disabled");
        }

        Ok(Self { client, config })
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &SpeechConfig {
        &self.config
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn api_key(&self) -> Result<&str, SpeechError> {
        self.config
            .usable_api_key()
            .ok_or(SpeechError::NotConfigured)
    }

    fn check_length(&self, text: &str) -> Result<(), SpeechError> {
        let chars = text.chars().count();
        if chars > self.config.max_text_chars {
            return Err(SpeechError::TextTooLong {
                chars,
                max: self.config.max_text_chars,
            });
        }
        Ok(())
    }
}

/// Pull a readable message out of the API's `detail` field
fn detail_message(body: &str) -> (Option<String>, String) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return (None, body.to_string());
    };
    match value.get("detail") {
        Some(serde_json::Value::String(message)) => (None, message.clone()),
        Some(detail @ serde_json::Value::Object(_)) => {
            let status = detail
                .get("status")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            let message = detail
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| detail.to_string(), str::to_string);
            (status, message)
        },
        Some(other) => (None, other.to_string()),
        None => (None, body.to_string()),
    }
}

async fn status_error(response: Response, voice: &str) -> SpeechError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let (detail_status, message) = detail_message(&body);
    warn!(status = %status, message = %message, "Speech synthesis request failed");

    match status {
        StatusCode::UNAUTHORIZED if detail_status.as_deref() == Some("quota_exceeded") => {
            SpeechError::QuotaExceeded(message)
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SpeechError::Unauthorized(message),
        StatusCode::NOT_FOUND => SpeechError::VoiceNotFound(voice.to_string()),
        StatusCode::TOO_MANY_REQUESTS => SpeechError::RateLimited,
        _ => SpeechError::SynthesisFailed(format!("Status {status}: {message}")),
    }
}

#[async_trait]
impl TextToSpeech for ElevenLabsProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), voice = voice.unwrap_or(&self.config.default_voice)))]
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        model: Option<&str>,
    ) -> Result<AudioData, SpeechError> {
        let api_key = self.api_key()?;
        self.check_length(text)?;

        let voice = voice
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(&self.config.default_voice);
        let format = self.config.output_format;
        let body = SynthesisRequest {
            text,
            model_id: model.unwrap_or(&self.config.model),
            voice_settings: self.config.voice_settings,
        };

        debug!("Sending text-to-speech request");

        let response = self
            .client
            .post(self.api_url(&format!("text-to-speech/{voice}")))
            .header("xi-api-key", api_key)
            .header(header::ACCEPT, format.mime_type())
            .query(&[("output_format", format.api_output_format())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::from_transport(&e, self.config.timeout_ms))?;

        if !response.status().is_success() {
            return Err(status_error(response, voice).await);
        }

        let returned_format = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(AudioFormat::from_mime_type)
            .unwrap_or(format);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(e.to_string()))?;

        if bytes.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "empty audio response".to_string(),
            ));
        }

        debug!(bytes = bytes.len(), "Speech synthesis completed");
        Ok(AudioData::new(bytes, returned_format))
    }

    async fn is_available(&self) -> bool {
        let Ok(api_key) = self.api_key() else {
            return false;
        };
        self.client
            .get(self.api_url("user"))
            .header("xi-api-key", api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok_and(|resp| resp.status().is_success())
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn default_voice(&self) -> &str {
        &self.config.default_voice
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
