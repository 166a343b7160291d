//! Artifact store port - Interface for the podcast output directory

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Timestamp layout embedded in artifact file names
pub const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `{name}_{timestamp}.{ext}` with the name reduced to a safe file stem
pub fn artifact_file_name(name: &str, timestamp: DateTime<Utc>, extension: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "podcast" } else { &stem };
    format!(
        "{stem}_{}.{extension}",
        timestamp.format(ARTIFACT_TIMESTAMP_FORMAT)
    )
}

/// Port for the flat, append-only output directory
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    /// Write a file and return its full path
    async fn save(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn file_name_embeds_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 7, 7, 34, 5).unwrap();
        assert_eq!(
            artifact_file_name("mando_minutes", ts, "mp3"),
            "mando_minutes_20250707_073405.mp3"
        );
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            artifact_file_name("Puck News/daily", ts, "txt"),
            "Puck_News_daily_20250102_030405.txt"
        );
    }

    #[test]
    fn empty_name_gets_placeholder_stem() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert!(artifact_file_name("  ", ts, "txt").starts_with("podcast_"));
    }
}
