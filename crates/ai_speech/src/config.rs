//! Configuration for speech synthesis

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::AudioFormat;

/// Configuration for the text-to-speech service
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// API key; `None`, empty and placeholder values leave synthesis unconfigured
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Voice used when the caller does not pick one
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Synthesis model
    #[serde(default = "default_model")]
    pub model: String,

    /// Voice tuning parameters sent with every request
    #[serde(default)]
    pub voice_settings: VoiceSettings,

    /// Output audio format
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// Longest text accepted in a single request, in characters
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Voice tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Lower values sound more expressive
    #[serde(default = "default_stability")]
    pub stability: f32,
    /// Closeness to the original voice
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
    /// Style exaggeration
    #[serde(default)]
    pub style: f32,
    /// Speaker boost
    #[serde(default = "default_use_speaker_boost")]
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            style: 0.0,
            use_speaker_boost: default_use_speaker_boost(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_voice() -> String {
    "pNInz6obpgDQGcFmaJgB".to_string()
}

fn default_model() -> String {
    "eleven_monolingual_v1".to_string()
}

const fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

const fn default_max_text_chars() -> usize {
    5000
}

const fn default_timeout_ms() -> u64 {
    120_000 // 2 minutes, long scripts take a while
}

const fn default_stability() -> f32 {
    0.5
}

const fn default_similarity_boost() -> f32 {
    0.75
}

const fn default_use_speaker_boost() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_voice: default_voice(),
            model: default_model(),
            voice_settings: VoiceSettings::default(),
            output_format: default_output_format(),
            max_text_chars: default_max_text_chars(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("default_voice", &self.default_voice)
            .field("model", &self.model)
            .field("voice_settings", &self.voice_settings)
            .field("output_format", &self.output_format)
            .field("max_text_chars", &self.max_text_chars)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl SpeechConfig {
    /// The API key, if it is a real one
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !is_placeholder_key(key))
    }

    /// Whether requests can be made at all
    pub fn is_configured(&self) -> bool {
        self.usable_api_key().is_some()
    }

    /// Validate the configuration
    ///
    /// A missing key is not an error; it only disables synthesis.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.default_voice.trim().is_empty() {
            return Err("default_voice must not be empty".to_string());
        }
        if self.max_text_chars == 0 {
            return Err("max_text_chars must be greater than zero".to_string());
        }
        for (name, value) in [
            ("stability", self.voice_settings.stability),
            ("similarity_boost", self.voice_settings.similarity_boost),
            ("style", self.voice_settings.style),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("voice_settings.{name} must be between 0.0 and 1.0"));
            }
        }
        Ok(())
    }
}

/// Empty keys and `YOUR_…` template values such as `YOUR_ELEVENLABS_API_KEY`
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || key.to_ascii_uppercase().starts_with("YOUR_")
}
