//! HTTP article client

use std::time::Duration;

use reqwest::{Client, header};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    config::ArticleConfig,
    error::ArticleError,
    links::LinkSelector,
    models::FetchedArticle,
    readable::extract_readable,
};

/// Fetches linked articles and reduces them to text
#[derive(Debug, Clone)]
pub struct ArticleClient {
    client: Client,
    config: ArticleConfig,
    selector: LinkSelector,
}

impl ArticleClient {
    /// Create a new client
    pub fn new(config: ArticleConfig) -> Result<Self, ArticleError> {
        config
            .validate()
            .map_err(ArticleError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ArticleError::ConfigurationError(e.to_string()))?;

        let selector = LinkSelector::from_config(&config);
        Ok(Self {
            client,
            config,
            selector,
        })
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &ArticleConfig {
        &self.config
    }

    /// Links in newsletter text worth following, best first
    #[must_use]
    pub fn candidate_links(&self, text: &str) -> Vec<String> {
        self.selector.select(text)
    }

    /// Download a page and reduce it to readable text
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<FetchedArticle, ArticleError> {
        let parsed = Url::parse(url).map_err(|e| ArticleError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ArticleError::InvalidUrl(url.to_string()));
        }
        let domain = parsed.host_str().unwrap_or_default().to_string();

        debug!("Fetching article");
        let response = self
            .client
            .get(parsed)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| ArticleError::from_transport(&e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Article request failed");
            return Err(ArticleError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);
        if let Some(content_type) =
            content_type.filter(|ct| !ct.contains("html") && !ct.starts_with("text/"))
        {
            return Err(ArticleError::UnsupportedContent(content_type));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ArticleError::from_transport(&e, self.config.timeout_ms))?;

        let readable = extract_readable(&body, &self.config);
        if readable.text.is_empty() {
            return Err(ArticleError::NoContent(url.to_string()));
        }

        debug!(words = readable.word_count, "Article fetched");
        Ok(FetchedArticle {
            url: url.to_string(),
            title: readable.title,
            domain,
            content: readable.text,
            word_count: readable.word_count,
        })
    }
}
