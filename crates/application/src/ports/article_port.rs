//! Article port - Interface for following links found in newsletters

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Readable text of a linked article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Source URL
    pub url: String,
    /// Page title
    pub title: String,
    /// Host the article was served from
    pub domain: String,
    /// Readable text, already capped
    pub content: String,
    /// Words in `content`
    pub word_count: usize,
}

/// Port for article discovery and retrieval
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ArticleFetcherPort: Send + Sync {
    /// Links worth following in newsletter text, best first
    fn candidate_links(&self, text: &str) -> Vec<String>;

    /// Download one article
    async fn fetch_article(&self, url: &str) -> Result<Article, ApplicationError>;
}
