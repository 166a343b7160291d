//! Link extraction and prioritisation
//!
//! Links come from `href` attributes and bare URLs in text. Social networks,
//! link shorteners and list-management URLs are dropped; trusted news hosts
//! move to the front. Order is otherwise first-seen.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::ArticleConfig;

static HREF: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?i)href\s*=\s*["'](https?://[^"'\s>]+)["']"#));
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"https?://[^\s<>"'{}|\\^`\[\]]+"#));

#[allow(clippy::expect_used)] // static patterns
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

/// Every http(s) URL in the text, deduplicated, in order of appearance
///
/// `href` targets come before bare URLs.
#[must_use]
pub fn extract_links(text: &str) -> Vec<String> {
    let hrefs = HREF
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"));
    let bare = BARE_URL
        .find_iter(text)
        .map(|m| trim_trailing_punctuation(m.as_str()).replace("&amp;", "&"));

    let mut links: Vec<String> = Vec::new();
    for link in hrefs.chain(bare) {
        if !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

/// Sentence punctuation glued to the end of a bare URL
fn trim_trailing_punctuation(url: &str) -> &str {
    url.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', '"'])
}

/// `host` is `domain` or one of its subdomains
fn host_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
    !domain.is_empty()
        && (host == domain
            || host
                .strip_suffix(domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.')))
}

/// Picks the links worth following
#[derive(Debug, Clone)]
pub struct LinkSelector {
    skip_domains: Vec<String>,
    trusted_domains: Vec<String>,
    blocked_url_fragments: Vec<String>,
    max_links: usize,
}

impl LinkSelector {
    /// Build from configuration
    #[must_use]
    pub fn from_config(config: &ArticleConfig) -> Self {
        Self {
            skip_domains: config.skip_domains.clone(),
            trusted_domains: config.trusted_domains.clone(),
            blocked_url_fragments: config
                .blocked_url_fragments
                .iter()
                .map(|f| f.to_ascii_lowercase())
                .collect(),
            max_links: config.max_links,
        }
    }

    /// Links in `text` worth following, trusted hosts first, capped
    #[must_use]
    pub fn select(&self, text: &str) -> Vec<String> {
        let mut trusted = Vec::new();
        let mut others = Vec::new();

        for link in extract_links(text) {
            let Some(host) = self.followable_host(&link) else {
                continue;
            };
            if self.trusted_domains.iter().any(|d| host_matches(&host, d)) {
                trusted.push(link);
            } else {
                others.push(link);
            }
        }

        trusted.extend(others);
        trusted.truncate(self.max_links);
        trusted
    }

    fn followable_host(&self, link: &str) -> Option<String> {
        let lowered = link.to_ascii_lowercase();
        if self
            .blocked_url_fragments
            .iter()
            .any(|fragment| lowered.contains(fragment.as_str()))
        {
            return None;
        }

        let url = Url::parse(link).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?.to_ascii_lowercase();
        if self.skip_domains.iter().any(|d| host_matches(&host, d)) {
            return None;
        }
        Some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> LinkSelector {
        LinkSelector::from_config(&ArticleConfig::default())
    }

    #[test]
    fn extracts_hrefs_and_bare_urls_once() {
        let html = r#"<a href="https://a.example/story?id=1&amp;ref=mail">A</a>
            See https://b.example/post. Also https://a.example/story?id=1&ref=mail"#;
        assert_eq!(
            extract_links(html),
            vec![
                "https://a.example/story?id=1&ref=mail".to_string(),
                "https://b.example/post".to_string(),
            ]
        );
    }

    #[test]
    fn trailing_punctuation_is_trimmed() {
        assert_eq!(
            extract_links("(see https://example.com/x), then"),
            vec!["https://example.com/x".to_string()]
        );
    }

    #[test]
    fn skips_social_and_list_management() {
        let text = "https://twitter.com/mando https://www.facebook.com/page \
                    https://bit.ly/abc https://mando.us1.list-manage.com/track \
                    https://example.com/unsubscribe?u=1 https://news.example/story";
        assert_eq!(selector().select(text), vec!["https://news.example/story".to_string()]);
    }

    #[test]
    fn skip_matches_whole_host_labels() {
        // "x.com" must not knock out every host ending in "x.com"
        let text = "https://x.com/post https://dropbox.com/file";
        assert_eq!(selector().select(text), vec!["https://dropbox.com/file".to_string()]);
    }

    #[test]
    fn trusted_hosts_go_first() {
        let text = "https://blog.example/a https://www.reuters.com/markets/b \
                    https://other.example/c https://coindesk.com/d";
        assert_eq!(
            selector().select(text),
            vec![
                "https://www.reuters.com/markets/b".to_string(),
                "https://coindesk.com/d".to_string(),
                "https://blog.example/a".to_string(),
                "https://other.example/c".to_string(),
            ]
        );
    }

    #[test]
    fn capped_at_max_links() {
        let text: String = (0..25)
            .map(|i| format!("https://site{i}.example/story "))
            .collect();
        let selected = selector().select(&text);
        assert_eq!(selected.len(), 10);
        assert_eq!(selected[0], "https://site0.example/story");
    }

    #[test]
    fn host_matching() {
        assert!(host_matches("www.reuters.com", "reuters.com"));
        assert!(host_matches("reuters.com", "reuters.com"));
        assert!(!host_matches("notreuters.com", "reuters.com"));
        assert!(!host_matches("reuters.com", ""));
    }
}
