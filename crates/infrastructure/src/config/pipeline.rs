//! Pipeline behavior and newsletter profiles.

use std::time::Duration;

use application::{
    ElaborationRule, ExtractorConfig, LocatorConfig, PipelineConfig, ScriptBuilderConfig,
    ScriptStrategy,
};
use domain::{DEFAULT_MAX_AGE_HOURS, NewsletterProfile, ReadStatePolicy, StyleProfile};
use serde::{Deserialize, Serialize};

use super::default_true;

/// How each newsletter moves through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineAppConfig {
    /// Script strategy tried first
    #[serde(default)]
    pub strategy: ScriptStrategy,

    /// Pause between newsletters in one run
    #[serde(default = "default_inter_item_delay_secs")]
    pub inter_item_delay_secs: u64,

    /// Extracted text shorter than this is flagged as degraded
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// What happens to the source message's read flag
    #[serde(default)]
    pub read_state_policy: ReadStatePolicy,

    /// Retry a zero-match search with the date bound a day earlier
    #[serde(default = "default_true")]
    pub relax_date_bound: bool,

    /// Word target for remotely generated scripts
    #[serde(default = "default_target_words")]
    pub target_words: usize,

    /// Extra line-start patterns dropped as boilerplate
    #[serde(default)]
    pub boilerplate_patterns: Vec<String>,

    /// Keyword-triggered sentences, first match wins
    #[serde(default)]
    pub elaborations: Vec<ElaborationRule>,
}

const fn default_inter_item_delay_secs() -> u64 {
    5
}

const fn default_min_content_chars() -> usize {
    50
}

const fn default_target_words() -> usize {
    450
}

impl Default for PipelineAppConfig {
    fn default() -> Self {
        Self {
            strategy: ScriptStrategy::default(),
            inter_item_delay_secs: default_inter_item_delay_secs(),
            min_content_chars: default_min_content_chars(),
            read_state_policy: ReadStatePolicy::default(),
            relax_date_bound: true,
            target_words: default_target_words(),
            boilerplate_patterns: Vec::new(),
            elaborations: Vec::new(),
        }
    }
}

impl PipelineAppConfig {
    /// Pipeline settings; `deliver` comes from the command line
    #[must_use]
    pub const fn to_pipeline_config(&self, deliver: bool) -> PipelineConfig {
        PipelineConfig {
            deliver,
            read_state_policy: self.read_state_policy,
            inter_item_delay: Duration::from_secs(self.inter_item_delay_secs),
        }
    }

    /// Extractor settings
    #[must_use]
    pub fn to_extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            min_content_chars: self.min_content_chars,
            extra_boilerplate_patterns: self.boilerplate_patterns.clone(),
        }
    }

    /// Locator settings for the given folder
    #[must_use]
    pub fn to_locator_config(&self, folder: &str) -> LocatorConfig {
        LocatorConfig {
            folder: folder.to_string(),
            relax_date_bound: self.relax_date_bound,
        }
    }

    /// Script builder settings
    #[must_use]
    pub fn to_script_config(&self, system_prompt: &str) -> ScriptBuilderConfig {
        ScriptBuilderConfig {
            strategy: self.strategy,
            system_prompt: system_prompt.to_string(),
            target_words: self.target_words,
            ..ScriptBuilderConfig::default()
        }
    }
}

/// One newsletter to look for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterConfig {
    /// Profile name, used on the command line and in file names
    pub name: String,

    /// Disabled profiles are skipped by `--all`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Acceptable sender addresses
    #[serde(default)]
    pub sender: Vec<String>,

    /// Subject substrings, any one must occur
    #[serde(default)]
    pub subject_contains: Vec<String>,

    /// Maximum message age in hours
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u32,

    /// Spoken before the content (`{name}`, `{date}`)
    #[serde(default)]
    pub intro_text: Option<String>,

    /// Spoken after the content
    #[serde(default)]
    pub outro_text: Option<String>,

    /// Voice override
    #[serde(default)]
    pub voice_id: Option<String>,

    /// Speech model override
    #[serde(default)]
    pub model: Option<String>,

    /// Paragraphs kept by the local script builder
    #[serde(default = "default_max_paragraphs")]
    pub max_paragraphs: usize,

    /// Shorter paragraphs are skipped by the local script builder
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,

    /// Fetch linked articles
    #[serde(default)]
    pub follow_links: bool,
}

const fn default_max_age_hours() -> u32 {
    DEFAULT_MAX_AGE_HOURS
}

const fn default_max_paragraphs() -> usize {
    4
}

const fn default_min_paragraph_chars() -> usize {
    50
}

impl NewsletterConfig {
    /// Build the domain profile
    #[must_use]
    pub fn to_profile(&self) -> NewsletterProfile {
        let defaults = StyleProfile::default();
        let style = StyleProfile {
            intro_text: self.intro_text.clone().unwrap_or(defaults.intro_text),
            outro_text: self.outro_text.clone().unwrap_or(defaults.outro_text),
            voice_id: self.voice_id.clone().filter(|v| !v.trim().is_empty()),
            model: self.model.clone().filter(|m| !m.trim().is_empty()),
            max_paragraphs: self.max_paragraphs,
            min_paragraph_chars: self.min_paragraph_chars,
        };

        let profile = self
            .sender
            .iter()
            .fold(NewsletterProfile::new(self.name.trim()), |p, s| p.with_sender(s));
        self.subject_contains
            .iter()
            .fold(profile, |p, s| p.with_subject(s.clone()))
            .with_max_age_hours(self.max_age_hours)
            .with_style(style)
            .with_follow_links(self.follow_links)
    }
}
