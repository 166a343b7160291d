//! Newsletter profile entity
//!
//! Identifies which sender/subject pattern constitutes a given newsletter and
//! how its podcast should sound.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{entities::MailMessage, errors::DomainError, value_objects::EmailAddress};

/// Default age window for newsletter discovery
pub const DEFAULT_MAX_AGE_HOURS: u32 = 24;

/// Presentation parameters for one newsletter's podcast
///
/// Intro and outro are templates; `{name}` and `{date}` are substituted by the
/// script builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// Spoken before the content
    pub intro_text: String,
    /// Spoken after the content
    pub outro_text: String,
    /// Voice override for speech synthesis
    pub voice_id: Option<String>,
    /// Speech model override
    pub model: Option<String>,
    /// Paragraphs kept by the local heuristic
    pub max_paragraphs: usize,
    /// Paragraphs shorter than this are skipped by the local heuristic
    pub min_paragraph_chars: usize,
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            intro_text: "Good morning! Welcome to your {name} podcast for {date}.".to_string(),
            outro_text: "That's your {name} update for today. Thanks for listening!".to_string(),
            voice_id: None,
            model: None,
            max_paragraphs: 4,
            min_paragraph_chars: 50,
        }
    }
}

/// Configuration record naming a newsletter to look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterProfile {
    /// Profile name, also used as artifact file prefix
    pub name: String,
    /// Acceptable sender addresses, lowercase
    pub senders: BTreeSet<String>,
    /// Subject substrings, at least one must occur (case-insensitive)
    pub subject_contains: Vec<String>,
    /// Maximum message age in hours
    pub max_age_hours: u32,
    /// Podcast presentation
    pub style: StyleProfile,
    /// Fetch linked articles referenced in the newsletter
    pub follow_links: bool,
}

impl NewsletterProfile {
    /// Create an empty profile with default age window and style
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            senders: BTreeSet::new(),
            subject_contains: Vec::new(),
            max_age_hours: DEFAULT_MAX_AGE_HOURS,
            style: StyleProfile::default(),
            follow_links: false,
        }
    }

    /// Add an acceptable sender address
    #[must_use]
    pub fn with_sender(mut self, address: impl AsRef<str>) -> Self {
        let address = address.as_ref().trim().to_lowercase();
        if !address.is_empty() {
            self.senders.insert(address);
        }
        self
    }

    /// Add a subject substring
    #[must_use]
    pub fn with_subject(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        if !needle.trim().is_empty() {
            self.subject_contains.push(needle);
        }
        self
    }

    /// Set the age window
    #[must_use]
    pub const fn with_max_age_hours(mut self, hours: u32) -> Self {
        self.max_age_hours = hours;
        self
    }

    /// Set the presentation style
    #[must_use]
    pub fn with_style(mut self, style: StyleProfile) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable link following
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Presence checks plus sender address syntax
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "newsletter name must not be empty".to_string(),
            ));
        }
        if self.senders.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "newsletter '{}' has no sender addresses",
                self.name
            )));
        }
        if self.subject_contains.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "newsletter '{}' has no subject substrings",
                self.name
            )));
        }
        for sender in &self.senders {
            EmailAddress::new(sender.as_str())?;
        }
        Ok(())
    }

    /// Oldest acceptable receipt time relative to `now`
    pub fn age_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(i64::from(self.max_age_hours))
    }

    /// Whether the address is one of the profile's senders
    pub fn matches_sender(&self, address: &str) -> bool {
        self.senders.contains(&address.trim().to_lowercase())
    }

    /// Whether the subject contains at least one configured substring
    pub fn matches_subject(&self, subject: &str) -> bool {
        let subject = subject.to_lowercase();
        self.subject_contains
            .iter()
            .any(|needle| subject.contains(&needle.to_lowercase()))
    }

    /// Whether a receipt time falls inside the age window
    pub fn is_within_age(&self, received_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        received_at >= self.age_cutoff(now)
    }

    /// Full match: sender membership, subject substring and age window
    pub fn matches(&self, message: &MailMessage, now: DateTime<Utc>) -> bool {
        self.matches_sender(message.sender())
            && self.matches_subject(message.subject())
            && self.is_within_age(message.received_at(), now)
    }
}
