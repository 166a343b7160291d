//! Article data types

use serde::{Deserialize, Serialize};

/// Readable text of a fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedArticle {
    /// Requested URL
    pub url: String,
    /// `<h1>` or `<title>` text, capped
    pub title: String,
    /// Host part of the URL
    pub domain: String,
    /// Readable text, capped at the configured word count
    pub content: String,
    /// Words in `content`, not counting the trailing ellipsis
    pub word_count: usize,
}
