//! Article fetching configuration

use serde::{Deserialize, Serialize};

/// Configuration for link selection and article fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleConfig {
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Links kept per newsletter
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Article text is cut after this many words
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Title is cut after this many characters
    #[serde(default = "default_max_title_chars")]
    pub max_title_chars: usize,

    /// Shorter paragraphs are treated as navigation noise
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,

    /// `User-Agent` header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Hosts never followed (social networks, link shorteners)
    #[serde(default = "default_skip_domains")]
    pub skip_domains: Vec<String>,

    /// Hosts moved to the front of the list
    #[serde(default = "default_trusted_domains")]
    pub trusted_domains: Vec<String>,

    /// URL substrings that mark list-management and tracking links
    #[serde(default = "default_blocked_url_fragments")]
    pub blocked_url_fragments: Vec<String>,
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_max_links() -> usize {
    10
}

const fn default_max_words() -> usize {
    500
}

const fn default_max_title_chars() -> usize {
    100
}

const fn default_min_paragraph_chars() -> usize {
    50
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn default_skip_domains() -> Vec<String> {
    strings(&[
        "twitter.com",
        "x.com",
        "facebook.com",
        "linkedin.com",
        "instagram.com",
        "youtube.com",
        "bit.ly",
        "tinyurl.com",
    ])
}

fn default_trusted_domains() -> Vec<String> {
    strings(&[
        "bloomberg.com",
        "reuters.com",
        "wsj.com",
        "ft.com",
        "techcrunch.com",
        "coindesk.com",
        "cointelegraph.com",
        "theverge.com",
        "arstechnica.com",
        "wired.com",
    ])
}

fn default_blocked_url_fragments() -> Vec<String> {
    strings(&[
        "unsubscribe",
        "email-preferences",
        "click.pstmrk.it",
        "list-manage.com",
    ])
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_links: default_max_links(),
            max_words: default_max_words(),
            max_title_chars: default_max_title_chars(),
            min_paragraph_chars: default_min_paragraph_chars(),
            user_agent: default_user_agent(),
            skip_domains: default_skip_domains(),
            trusted_domains: default_trusted_domains(),
            blocked_url_fragments: default_blocked_url_fragments(),
        }
    }
}

impl ArticleConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }
        if self.max_words == 0 {
            return Err("max_words must be greater than zero".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }
        Ok(())
    }
}
