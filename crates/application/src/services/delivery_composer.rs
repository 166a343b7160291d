//! Delivery composer - Builds the email that carries a finished podcast

use chrono::{DateTime, Utc};
use domain::{AudioFormat, MailMessage, NewsletterProfile, PodcastScript};

use crate::ports::{Attachment, OutgoingMail};

/// Default subject template
pub const DEFAULT_SUBJECT_TEMPLATE: &str = "🎙️ {name} Podcast - {date}";

/// Default body template
pub const DEFAULT_BODY_TEMPLATE: &str = "Your {name} podcast is ready.\n\n\
Source: {subject}\n\
From: {sender}\n\
Estimated duration: ~{duration} minutes ({words} words)\n\
Linked articles: {articles}\n\
Generated: {timestamp}\n\n\
{attachment_note}\n";

/// Delivery settings
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Recipient address
    pub recipient: String,
    /// Subject template (`{name}`, `{date}`)
    pub subject_template: String,
    /// Body template
    pub body_template: String,
}

/// What was produced for one newsletter
#[derive(Debug, Clone, Copy)]
pub struct DeliveryContent<'a> {
    /// Profile the issue belongs to
    pub profile: &'a NewsletterProfile,
    /// Source newsletter
    pub source: &'a MailMessage,
    /// Generated script
    pub script: &'a PodcastScript,
    /// Audio bytes and format, when synthesis succeeded
    pub audio: Option<(&'a [u8], AudioFormat)>,
    /// File stem shared by the run's artifacts
    pub file_stem: &'a str,
    /// Number of linked articles folded into the script
    pub article_count: usize,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

/// Builds outgoing podcast emails
#[derive(Debug, Clone)]
pub struct DeliveryComposer {
    config: DeliveryConfig,
}

impl DeliveryComposer {
    /// Create a composer
    pub const fn new(config: DeliveryConfig) -> Self {
        Self { config }
    }

    /// Recipient address
    pub fn recipient(&self) -> &str {
        &self.config.recipient
    }

    /// Compose the message: audio attached when present, otherwise the script
    /// as a text file
    pub fn compose(&self, content: &DeliveryContent<'_>) -> OutgoingMail {
        let (attachment, note) = match content.audio {
            Some((bytes, format)) => (
                Attachment {
                    filename: format!("{}.{}", content.file_stem, format.extension()),
                    content_type: format.mime_type().to_string(),
                    data: bytes.to_vec(),
                },
                "The audio episode is attached.",
            ),
            None => (
                Attachment {
                    filename: format!("{}.txt", content.file_stem),
                    content_type: "text/plain; charset=utf-8".to_string(),
                    data: content.script.text().as_bytes().to_vec(),
                },
                "Audio could not be generated this time; the script is attached instead.",
            ),
        };

        OutgoingMail {
            to: self.config.recipient.clone(),
            subject: render(&self.config.subject_template, content, note),
            body: render(&self.config.body_template, content, note),
            attachment: Some(attachment),
        }
    }
}

fn render(template: &str, content: &DeliveryContent<'_>, note: &str) -> String {
    template
        .replace("{name}", &content.profile.name.replace(['_', '-'], " "))
        .replace(
            "{date}",
            &content.generated_at.format("%B %-d, %Y").to_string(),
        )
        .replace("{subject}", content.source.subject())
        .replace("{sender}", content.source.sender())
        .replace("{duration}", &content.script.duration_minutes().to_string())
        .replace("{words}", &content.script.word_count().to_string())
        .replace("{articles}", &content.article_count.to_string())
        .replace(
            "{timestamp}",
            &content
                .generated_at
                .format("%B %-d, %Y at %H:%M UTC")
                .to_string(),
        )
        .replace("{attachment_note}", note)
}
