//! Domain entities

mod extracted_content;
mod mail_message;
mod newsletter_profile;
mod podcast_script;

pub use extracted_content::{ContentSource, ExtractedContent, ExtractionFailure};
pub use mail_message::{DepthFirstParts, MailMessage, MimePart, PartDisposition};
pub use newsletter_profile::{DEFAULT_MAX_AGE_HOURS, NewsletterProfile, StyleProfile};
pub use podcast_script::{
    PodcastScript, SPEAKING_RATE_WPM, ScriptOrigin, count_words, estimate_duration_minutes,
};
