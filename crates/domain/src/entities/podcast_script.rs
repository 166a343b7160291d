//! Podcast script entity

use serde::{Deserialize, Serialize};

/// Assumed speaking rate used for duration estimates
pub const SPEAKING_RATE_WPM: usize = 150;

/// How a script was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptOrigin {
    /// Written by a hosted language model
    Remote {
        /// Model that produced the text
        model: String,
    },
    /// Local template heuristic
    Local,
    /// Framed echo of the raw content after every strategy came up short
    Fallback,
}

/// Generated spoken text plus derived metadata
///
/// Word count and duration are always derived from the final text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastScript {
    text: String,
    word_count: usize,
    duration_minutes: u32,
    origin: ScriptOrigin,
}

impl PodcastScript {
    /// Build a script and compute its metadata
    pub fn new(text: impl Into<String>, origin: ScriptOrigin) -> Self {
        let text = text.into();
        let word_count = count_words(&text);
        Self {
            duration_minutes: estimate_duration_minutes(word_count),
            text,
            word_count,
            origin,
        }
    }

    /// Script text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whitespace-separated words in the text
    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Estimated spoken duration, never zero
    pub const fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Strategy that produced the text
    pub const fn origin(&self) -> &ScriptOrigin {
        &self.origin
    }
}

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `max(1, round(words / 150))`, rounding halves up
pub fn estimate_duration_minutes(word_count: usize) -> u32 {
    let minutes = (word_count + SPEAKING_RATE_WPM / 2) / SPEAKING_RATE_WPM;
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}
