//! Remote service configuration: script generation, speech, article fetching.

use std::time::Duration;

use ai_core::InferenceConfig;
use ai_speech::{SpeechConfig, VoiceSettings};
use application::{DEFAULT_SYSTEM_PROMPT, LinkFollowerConfig};
use integration_articles::ArticleConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

fn redacted(secret: Option<&SecretString>) -> Option<&'static str> {
    secret.map(|_| "[REDACTED]")
}

fn exposed(secret: Option<&SecretString>) -> Option<String> {
    secret.map(|s| s.expose_secret().to_string())
}

/// Hosted chat-completions model used for remote script generation
#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceAppConfig {
    /// API base URL
    #[serde(default = "default_inference_base_url")]
    pub base_url: String,

    /// API key; empty and `YOUR_…` placeholders leave remote generation off
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Model name
    #[serde(default = "default_inference_model")]
    pub model: String,

    /// Maximum tokens generated per script
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(default = "default_inference_timeout_ms")]
    pub timeout_ms: u64,

    /// System prompt for script generation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl std::fmt::Debug for InferenceAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceAppConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redacted(self.api_key.as_ref()))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

fn default_inference_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_inference_model() -> String {
    "gpt-4o-mini".to_string()
}

const fn default_max_tokens() -> u32 {
    1000
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_inference_timeout_ms() -> u64 {
    60_000
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for InferenceAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_base_url(),
            api_key: None,
            model: default_inference_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: default_inference_timeout_ms(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl InferenceAppConfig {
    /// Build the inference engine configuration
    #[must_use]
    pub fn to_inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            base_url: self.base_url.clone(),
            api_key: exposed(self.api_key.as_ref()),
            default_model: self.model.clone(),
            timeout_ms: self.timeout_ms,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Text-to-speech service
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechAppConfig {
    /// API base URL
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,

    /// API key; empty and `YOUR_…` placeholders leave synthesis off
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Voice used when a newsletter does not pick one
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Synthesis model
    #[serde(default = "default_speech_model")]
    pub model: String,

    /// Voice tuning
    #[serde(default)]
    pub voice_settings: VoiceSettings,

    /// Longest script sent in one request
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Request timeout in milliseconds
    #[serde(default = "default_speech_timeout_ms")]
    pub timeout_ms: u64,
}

impl std::fmt::Debug for SpeechAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechAppConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redacted(self.api_key.as_ref()))
            .field("voice_id", &self.voice_id)
            .field("model", &self.model)
            .field("voice_settings", &self.voice_settings)
            .field("max_text_chars", &self.max_text_chars)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn default_speech_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_voice_id() -> String {
    SpeechConfig::default().default_voice
}

fn default_speech_model() -> String {
    "eleven_monolingual_v1".to_string()
}

const fn default_max_text_chars() -> usize {
    5000
}

const fn default_speech_timeout_ms() -> u64 {
    120_000
}

impl Default for SpeechAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            api_key: None,
            voice_id: default_voice_id(),
            model: default_speech_model(),
            voice_settings: VoiceSettings::default(),
            max_text_chars: default_max_text_chars(),
            timeout_ms: default_speech_timeout_ms(),
        }
    }
}

impl SpeechAppConfig {
    /// Build the speech provider configuration
    #[must_use]
    pub fn to_speech_config(&self) -> SpeechConfig {
        SpeechConfig {
            api_key: exposed(self.api_key.as_ref()),
            base_url: self.base_url.clone(),
            default_voice: self.voice_id.clone(),
            model: self.model.clone(),
            voice_settings: self.voice_settings,
            max_text_chars: self.max_text_chars,
            timeout_ms: self.timeout_ms,
            ..SpeechConfig::default()
        }
    }
}

/// Linked-article fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlesAppConfig {
    /// Per-request timeout in milliseconds
    #[serde(default = "default_article_timeout_ms")]
    pub timeout_ms: u64,

    /// Concurrent fetches
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Links followed per newsletter
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Words kept per article
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// `User-Agent` override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Replaces the built-in list of skipped hosts
    #[serde(default)]
    pub skip_domains: Option<Vec<String>>,

    /// Replaces the built-in list of trusted news hosts
    #[serde(default)]
    pub trusted_domains: Option<Vec<String>>,
}

const fn default_article_timeout_ms() -> u64 {
    10_000
}

const fn default_max_workers() -> usize {
    5
}

const fn default_max_links() -> usize {
    10
}

const fn default_max_words() -> usize {
    500
}

impl Default for ArticlesAppConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_article_timeout_ms(),
            max_workers: default_max_workers(),
            max_links: default_max_links(),
            max_words: default_max_words(),
            user_agent: None,
            skip_domains: None,
            trusted_domains: None,
        }
    }
}

impl ArticlesAppConfig {
    /// Build the article client configuration
    #[must_use]
    pub fn to_article_config(&self) -> ArticleConfig {
        let defaults = ArticleConfig::default();
        ArticleConfig {
            timeout_ms: self.timeout_ms,
            max_links: self.max_links,
            max_words: self.max_words,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            skip_domains: self.skip_domains.clone().unwrap_or(defaults.skip_domains),
            trusted_domains: self
                .trusted_domains
                .clone()
                .unwrap_or(defaults.trusted_domains),
            ..ArticleConfig::default()
        }
    }

    /// Build the link follower configuration
    #[must_use]
    pub const fn to_follower_config(&self) -> LinkFollowerConfig {
        LinkFollowerConfig {
            max_links: self.max_links,
            max_workers: self.max_workers,
            request_timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}
