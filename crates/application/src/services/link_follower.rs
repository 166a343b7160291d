//! Link follower - Fetches articles referenced by a newsletter
//!
//! Fetches run on a bounded pool with an independent timeout each. A failed
//! fetch is dropped from the result; it never fails the batch.

use std::{fmt, sync::Arc, time::Duration};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument};

use crate::ports::{Article, ArticleFetcherPort};

/// Link following settings
#[derive(Debug, Clone)]
pub struct LinkFollowerConfig {
    /// Links fetched per newsletter
    pub max_links: usize,
    /// Concurrent fetches
    pub max_workers: usize,
    /// Per-fetch timeout
    pub request_timeout: Duration,
}

impl Default for LinkFollowerConfig {
    fn default() -> Self {
        Self {
            max_links: 10,
            max_workers: 5,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Follows newsletter links to their articles
pub struct LinkFollower {
    fetcher: Arc<dyn ArticleFetcherPort>,
    config: LinkFollowerConfig,
}

impl fmt::Debug for LinkFollower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkFollower")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LinkFollower {
    /// Create a link follower
    pub fn new(fetcher: Arc<dyn ArticleFetcherPort>, config: LinkFollowerConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch the articles linked from the given texts, best link first
    #[instrument(skip(self, texts))]
    pub async fn follow(&self, texts: &[String]) -> Vec<Article> {
        let mut links: Vec<String> = Vec::new();
        for text in texts {
            for link in self.fetcher.candidate_links(text) {
                if !links.contains(&link) {
                    links.push(link);
                }
            }
        }
        links.truncate(self.config.max_links);

        if links.is_empty() {
            debug!("No links worth following");
            return Vec::new();
        }

        let attempted = links.len();
        let timeout = self.config.request_timeout;
        let fetcher = &self.fetcher;

        let mut fetched: Vec<(usize, Article)> = stream::iter(links.into_iter().enumerate())
            .map(|(rank, url)| async move {
                match tokio::time::timeout(timeout, fetcher.fetch_article(&url)).await {
                    Ok(Ok(article)) => Some((rank, article)),
                    Ok(Err(e)) => {
                        debug!(url = %url, error = %e, "Skipping article");
                        None
                    },
                    Err(_) => {
                        debug!(url = %url, "Skipping article after timeout");
                        None
                    },
                }
            })
            .buffer_unordered(self.config.max_workers.max(1))
            .filter_map(|result| async move { result })
            .collect()
            .await;

        fetched.sort_by_key(|(rank, _)| *rank);
        info!(
            attempted,
            fetched = fetched.len(),
            "🔗 Followed newsletter links"
        );
        fetched.into_iter().map(|(_, article)| article).collect()
    }
}
