//! HTML page to readable article text
//!
//! A regex reduction, not a DOM parse: noise blocks go, then `<article>` or
//! `<main>` text is used when substantial, otherwise every long-enough `<p>`.

use std::sync::LazyLock;

use application::strip_html;
use regex::Regex;

use crate::config::ArticleConfig;

/// Container text shorter than this falls back to paragraph collection
const SUBSTANTIAL_CHARS: usize = 200;

const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "form", "button", "iframe",
];

static NOISE_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NOISE_TAGS
        .iter()
        .map(|tag| compile(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")))
        .collect()
});
static H1: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<title\b[^>]*>(.*?)</title\s*>"));
static ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<article\b[^>]*>(.*?)</article\s*>"));
static MAIN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<main\b[^>]*>(.*?)</main\s*>"));
static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<p\b[^>]*>(.*?)</p\s*>"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

#[allow(clippy::expect_used)] // static patterns
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

/// Title and body text of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readable {
    /// Page title, possibly empty
    pub title: String,
    /// Body text on one line, possibly empty
    pub text: String,
    /// Words kept in `text`
    pub word_count: usize,
}

/// Reduce an HTML page to its title and readable text
#[must_use]
pub fn extract_readable(html: &str, config: &ArticleConfig) -> Readable {
    // before noise removal, the h1 often lives in <header>
    let title = first_capture(&H1, html)
        .filter(|t| !t.is_empty())
        .or_else(|| first_capture(&TITLE, html))
        .unwrap_or_default();
    let title: String = title.chars().take(config.max_title_chars).collect();

    let cleaned = NOISE_BLOCKS
        .iter()
        .fold(html.to_string(), |acc, re| re.replace_all(&acc, " ").into_owned());

    let mut text = container_text(&ARTICLE, &cleaned);
    if text.chars().count() <= SUBSTANTIAL_CHARS {
        let main = container_text(&MAIN, &cleaned);
        if main.chars().count() > text.chars().count() {
            text = main;
        }
    }
    if text.chars().count() <= SUBSTANTIAL_CHARS {
        text = long_paragraphs(&cleaned, config.min_paragraph_chars);
    }

    let (text, word_count) = cap_words(&text, config.max_words);
    Readable {
        title,
        text,
        word_count,
    }
}

fn to_line(html: &str) -> String {
    WHITESPACE
        .replace_all(&strip_html(html), " ")
        .trim()
        .to_string()
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| to_line(m.as_str()))
}

fn container_text(re: &Regex, html: &str) -> String {
    re.captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| to_line(m.as_str()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn long_paragraphs(html: &str, min_chars: usize) -> String {
    PARAGRAPH
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| to_line(m.as_str()))
        .filter(|p| p.chars().count() > min_chars)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep the first `max_words` words; an ellipsis marks the cut
fn cap_words(text: &str, max_words: usize) -> (String, usize) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        (format!("{}...", words[..max_words].join(" ")), max_words)
    } else {
        (words.join(" "), words.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLER: &str = "Bitcoin climbed above its previous record as institutional demand \
                          continued to build through the week.";

    #[test]
    fn prefers_article_element() {
        let html = format!(
            "<html><head><title>Site | Story</title><style>p {{ color: red }}</style></head>\
             <body><header><h1>Bitcoin hits a record</h1><nav>Home News</nav></header>\
             <article><p>{FILLER}</p><p>{FILLER}</p><script>track()</script></article>\
             <footer>Copyright</footer></body></html>"
        );
        let readable = extract_readable(&html, &ArticleConfig::default());
        assert_eq!(readable.title, "Bitcoin hits a record");
        assert!(readable.text.starts_with("Bitcoin climbed"));
        assert!(!readable.text.contains("track()"));
        assert!(!readable.text.contains("Home News"));
        assert!(!readable.text.contains("Copyright"));
        assert!(!readable.text.contains('<'));
    }

    #[test]
    fn falls_back_to_long_paragraphs() {
        let html = format!(
            "<title>Fallback &amp; Title</title><div><p>Short teaser.</p><p>{FILLER}</p></div>"
        );
        let readable = extract_readable(&html, &ArticleConfig::default());
        assert_eq!(readable.title, "Fallback & Title");
        assert_eq!(readable.text, FILLER.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn caps_words_with_ellipsis() {
        let body = "word ".repeat(30);
        let html = format!("<article><p>{body}</p><p>{body}</p></article>");
        let config = ArticleConfig {
            max_words: 10,
            ..ArticleConfig::default()
        };
        let readable = extract_readable(&html, &config);
        assert_eq!(readable.word_count, 10);
        assert!(readable.text.ends_with("word..."));
    }

    #[test]
    fn title_is_capped() {
        let html = format!("<h1>{}</h1>", "t".repeat(150));
        let readable = extract_readable(&html, &ArticleConfig::default());
        assert_eq!(readable.title.chars().count(), 100);
    }

    #[test]
    fn empty_page_gives_empty_text() {
        let readable = extract_readable("<html><body></body></html>", &ArticleConfig::default());
        assert!(readable.title.is_empty());
        assert!(readable.text.is_empty());
        assert_eq!(readable.word_count, 0);
    }
}
