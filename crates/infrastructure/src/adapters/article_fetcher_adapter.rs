//! Article fetcher adapter - Implements ArticleFetcherPort using integration_articles

use application::{
    error::ApplicationError,
    ports::{Article, ArticleFetcherPort},
};
use async_trait::async_trait;
use integration_articles::{ArticleClient, ArticleConfig, ArticleError, FetchedArticle};
use tracing::instrument;

/// Fetches linked articles over HTTP
#[derive(Debug, Clone)]
pub struct ArticleFetcherAdapter {
    client: ArticleClient,
}

impl ArticleFetcherAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: ArticleConfig) -> Result<Self, ApplicationError> {
        let client = ArticleClient::new(config).map_err(|e| match e {
            ArticleError::ConfigurationError(msg) => ApplicationError::Configuration(msg),
            other => ApplicationError::Internal(other.to_string()),
        })?;
        Ok(Self { client })
    }

    /// Fetch failures only cost one article
    fn map_error(e: ArticleError) -> ApplicationError {
        ApplicationError::ExternalService(e.to_string())
    }

    fn convert(article: FetchedArticle) -> Article {
        Article {
            url: article.url,
            title: article.title,
            domain: article.domain,
            content: article.content,
            word_count: article.word_count,
        }
    }
}

#[async_trait]
impl ArticleFetcherPort for ArticleFetcherAdapter {
    fn candidate_links(&self, text: &str) -> Vec<String> {
        self.client.candidate_links(text)
    }

    #[instrument(skip(self))]
    async fn fetch_article(&self, url: &str) -> Result<Article, ApplicationError> {
        self.client
            .fetch(url)
            .await
            .map(Self::convert)
            .map_err(Self::map_error)
    }
}
