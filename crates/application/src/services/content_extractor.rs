//! Content extractor - Turns a mail message into normalized plain text
//!
//! The first inline `text/plain` part wins; without one, the first inline
//! `text/html` part is reduced to text with a regex tag strip. Extraction is
//! total: every input yields an [`ExtractedContent`], possibly empty and
//! carrying the failure marker.

use std::{borrow::Cow, sync::LazyLock};

use domain::{ContentSource, ExtractedContent, MailMessage, MimePart};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ApplicationError;

/// Line-anchored patterns that start trailing list-management boilerplate
pub const DEFAULT_BOILERPLATE_PATTERNS: &[&str] = &[
    r"unsubscribe",
    r"update (?:your )?(?:email )?preferences",
    r"manage (?:your )?(?:subscription|preferences|email settings)",
    r"this (?:email|message|newsletter) was sent",
    r"you(?:'re| are)? receiv(?:ed|ing) this",
    r"privacy policy",
    r"view (?:this )?(?:email )?(?:in|on) (?:your |a )?(?:browser|web)",
    r"view online",
    r"follow us on",
    r"copyright",
    r"©",
];

static COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));
static INVISIBLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?is)<(?:script|style|head|title)\b[^>]*>.*?</(?:script|style|head|title)\s*>")
});
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)<br\s*/?>|</(?:p|div|tr|li|h[1-6]|table|blockquote|section|article)\s*>")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<[^>]*>"));
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));"));
static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[ \t\u{00a0}\u{000b}\u{000c}\u{2000}-\u{200a}\u{202f}\u{3000}]+"));
static INVISIBLE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[\u{200b}-\u{200d}\u{2060}\u{feff}\u{034f}\u{00ad}]"));
static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| compile(r"\n{3,}"));

#[allow(clippy::expect_used)] // static patterns
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

/// Extractor settings
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Text shorter than this counts as a failed extraction
    pub min_content_chars: usize,
    /// Extra boilerplate patterns, case-insensitive, anchored at line start
    pub extra_boilerplate_patterns: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 50,
            extra_boilerplate_patterns: Vec::new(),
        }
    }
}

/// Extracts readable text from MIME messages
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    boilerplate: Regex,
    min_content_chars: usize,
}

impl ContentExtractor {
    /// Create an extractor
    ///
    /// Fails only if an extra boilerplate pattern is not a valid regex.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ApplicationError> {
        let alternatives: Vec<&str> = DEFAULT_BOILERPLATE_PATTERNS
            .iter()
            .copied()
            .chain(config.extra_boilerplate_patterns.iter().map(String::as_str))
            .collect();
        let pattern = format!(r"(?im)^[ \t]*(?:{})", alternatives.join("|"));
        let boilerplate = Regex::new(&pattern).map_err(|e| {
            ApplicationError::Configuration(format!("invalid boilerplate pattern: {e}"))
        })?;

        Ok(Self {
            boilerplate,
            min_content_chars: config.min_content_chars,
        })
    }

    /// Minimum usable length in characters
    pub const fn min_content_chars(&self) -> usize {
        self.min_content_chars
    }

    /// Extract normalized text from a message
    pub fn extract(&self, message: &MailMessage) -> ExtractedContent {
        let mut html: Option<&MimePart> = None;

        for part in message.walk_parts() {
            if part.is_inline("text/plain") {
                let text = decode_part(part);
                if text.trim().is_empty() {
                    debug!(uid = %message.uid(), "Skipping blank text/plain part");
                    continue;
                }
                return ExtractedContent::new(self.clean(&text), ContentSource::PlainText);
            }
            if html.is_none() && part.is_inline("text/html") {
                html = Some(part);
            }
        }

        match html {
            Some(part) => {
                let text = strip_html(&decode_part(part));
                ExtractedContent::new(self.clean(&text), ContentSource::Html)
            },
            None => {
                warn!(uid = %message.uid(), "⚠️ Message has no readable text part");
                ExtractedContent::unreadable()
            },
        }
    }

    /// Decoded text of every inline text part, unstripped
    ///
    /// Used for link discovery, where HTML attributes still matter.
    pub fn raw_text_parts(message: &MailMessage) -> Vec<String> {
        message
            .walk_parts()
            .filter(|p| p.is_inline("text/plain") || p.is_inline("text/html"))
            .map(decode_part)
            .collect()
    }

    fn clean(&self, text: &str) -> String {
        self.strip_boilerplate(&normalize_whitespace(text))
    }

    /// Remove everything from the first boilerplate line to the end
    ///
    /// Matches before any body text (a leading "View in browser" banner) only
    /// drop their own line.
    fn strip_boilerplate(&self, text: &str) -> String {
        let mut text = text.trim().to_string();
        while let Some(found) = self.boilerplate.find(&text) {
            let start = found.start();
            if !text[..start].trim().is_empty() {
                text.truncate(start);
                break;
            }
            let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
            text = text[line_end..].trim_start().to_string();
        }
        text.trim_end().to_string()
    }
}

/// Decode a part's bytes using its declared charset when possible
pub fn decode_part(part: &MimePart) -> String {
    decode_bytes(part.body(), part.charset())
}

/// Decode bytes to text; never fails
///
/// Tries the declared charset, then UTF-8, then Windows-1252 (a superset of
/// Latin-1's printable range), each strictly. Invalid sequences are replaced
/// only as a last resort.
pub fn decode_bytes(bytes: &[u8], declared_charset: Option<&str>) -> String {
    let declared = declared_charset
        .filter(|label| !label.eq_ignore_ascii_case("us-ascii"))
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()));

    for encoding in declared.into_iter().chain([UTF_8, WINDOWS_1252]) {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return text.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// Reduce HTML to text
///
/// Drops comments and invisible blocks, turns block ends into line breaks,
/// removes tags and decodes common entities. The final tag pass guarantees no
/// `<...>` fragment survives entity decoding.
pub fn strip_html(html: &str) -> String {
    let text = COMMENT.replace_all(html, "");
    let text = INVISIBLE_BLOCK.replace_all(&text, "");
    let text = BLOCK_BREAK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    TAG.replace_all(&text, "").into_owned()
}

fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&zwnj;", "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&mdash;", "\u{2014}")
        .replace("&ndash;", "\u{2013}")
        .replace("&hellip;", "\u{2026}")
        .replace("&bull;", "\u{2022}")
        .replace("&copy;", "\u{a9}");

    let numeric: Cow<'_, str> = NUMERIC_ENTITY.replace_all(&named, |caps: &regex::Captures| {
        let code = caps
            .get(1)
            .and_then(|hex| u32::from_str_radix(hex.as_str(), 16).ok())
            .or_else(|| caps.get(2).and_then(|dec| dec.as_str().parse().ok()));
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    // &amp; last so "&amp;lt;" stays literal
    numeric.replace("&amp;", "&")
}

/// Normalize line endings and whitespace
///
/// Runs of horizontal whitespace become one space, lines are trimmed and three
/// or more consecutive newlines collapse to two.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = INVISIBLE_CHARS.replace_all(&text, "");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    EXCESS_NEWLINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::ExtractionFailure;

    use super::*;

    fn extractor() -> ContentExtractor {
        ContentExtractor::new(&ExtractorConfig::default()).unwrap()
    }

    fn message(parts: Vec<MimePart>) -> MailMessage {
        parts.into_iter().fold(
            MailMessage::new(1, "Mando Minutes", "news@mandominutes.com", Utc::now()),
            MailMessage::with_part,
        )
    }

    const BODY: &str = "Bitcoin rallied to a new weekly high as ETF inflows continued for a fifth day.";

    #[test]
    fn plain_text_part_is_preferred() {
        let msg = message(vec![MimePart::multipart(
            "alternative",
            vec![
                MimePart::new("text/html", format!("<p>HTML {BODY}</p>")),
                MimePart::new("text/plain", BODY),
            ],
        )]);
        let content = extractor().extract(&msg);
        assert_eq!(content.source(), ContentSource::PlainText);
        assert_eq!(content.text(), BODY);
    }

    #[test]
    fn html_is_used_when_no_plain_part() {
        let html = format!(
            "<html><head><style>p {{ color: red; }}</style></head>\
             <body><p>{BODY}</p><p>Second&nbsp;paragraph &amp; more.</p></body></html>"
        );
        let content = extractor().extract(&message(vec![MimePart::new("text/html", html)]));
        assert_eq!(content.source(), ContentSource::Html);
        assert!(content.text().contains("Bitcoin rallied"));
        assert!(content.text().contains("Second paragraph & more."));
        assert!(!content.text().contains("color"));
        assert!(!content.text().contains('<'));
    }

    #[test]
    fn entity_encoded_tags_do_not_survive() {
        let html = format!("<p>{BODY} &lt;script&gt;alert(1)&lt;/script&gt;</p>");
        let content = extractor().extract(&message(vec![MimePart::new("text/html", html)]));
        assert!(!content.text().contains("<script>"));
    }

    #[test]
    fn blank_plain_part_falls_back_to_html() {
        let msg = message(vec![
            MimePart::new("text/plain", " \r\n "),
            MimePart::new("text/html", format!("<div>{BODY}</div>")),
        ]);
        let content = extractor().extract(&msg);
        assert_eq!(content.source(), ContentSource::Html);
    }

    #[test]
    fn attachments_are_ignored() {
        let msg = message(vec![
            MimePart::new("text/plain", "attached notes").as_attachment(),
            MimePart::new("text/html", format!("<p>{BODY}</p>")),
        ]);
        assert_eq!(extractor().extract(&msg).source(), ContentSource::Html);
    }

    #[test]
    fn missing_text_parts_yield_failure_marker() {
        let msg = message(vec![MimePart::new("image/png", vec![0x89, 0x50])]);
        let content = extractor().extract(&msg);
        assert!(content.is_empty());
        assert_eq!(content.failure(50), Some(ExtractionFailure::NoReadablePart));
    }

    #[test]
    fn short_text_is_distinguished_from_missing_text() {
        let content = extractor().extract(&message(vec![MimePart::new("text/plain", "Hi")]));
        assert!(matches!(
            content.failure(50),
            Some(ExtractionFailure::TooShort { chars: 2, .. })
        ));
    }

    #[test]
    fn trailing_boilerplate_is_removed() {
        let text = format!(
            "{BODY}\n\nMore news here.\n\nUnsubscribe | Update preferences\n\nMando Inc, 1 Main St"
        );
        let content = extractor().extract(&message(vec![MimePart::new("text/plain", text)]));
        assert!(content.text().ends_with("More news here."));
        assert!(!content.text().contains("Mando Inc"));
    }

    #[test]
    fn leading_banner_only_drops_its_line() {
        let text = format!("View this email in your browser\n\n{BODY}\n\nCopyright 2025 Mando");
        let content = extractor().extract(&message(vec![MimePart::new("text/plain", text)]));
        assert_eq!(content.text(), BODY);
    }

    #[test]
    fn mid_line_mentions_are_kept() {
        let text = format!("{BODY} Readers who unsubscribe miss out.");
        let content = extractor().extract(&message(vec![MimePart::new("text/plain", text)]));
        assert!(content.text().contains("unsubscribe miss out"));
    }

    #[test]
    fn extra_patterns_are_applied() {
        let config = ExtractorConfig {
            extra_boilerplate_patterns: vec!["sponsored by".to_string()],
            ..ExtractorConfig::default()
        };
        let extractor = ContentExtractor::new(&config).unwrap();
        let text = format!("{BODY}\nSponsored by Acme");
        let content = extractor.extract(&message(vec![MimePart::new("text/plain", text)]));
        assert_eq!(content.text(), BODY);
    }

    #[test]
    fn invalid_extra_pattern_is_a_configuration_error() {
        let config = ExtractorConfig {
            extra_boilerplate_patterns: vec!["(".to_string()],
            ..ExtractorConfig::default()
        };
        assert!(matches!(
            ContentExtractor::new(&config),
            Err(ApplicationError::Configuration(_))
        ));
    }

    #[test]
    fn whitespace_is_normalized() {
        let text = "A  \t B\r\n\r\n\r\n\r\n   C\u{00a0}\u{00a0}D\u{200b}";
        assert_eq!(normalize_whitespace(text), "A B\n\nC D");
    }

    #[test]
    fn latin1_bytes_are_decoded() {
        let bytes = b"Caf\xe9 cr\xe8me";
        assert_eq!(decode_bytes(bytes, Some("iso-8859-1")), "Café crème");
        assert_eq!(decode_bytes(bytes, None), "Café crème");
    }

    #[test]
    fn utf8_wins_over_mislabelled_ascii() {
        let bytes = "Café".as_bytes();
        assert_eq!(decode_bytes(bytes, Some("us-ascii")), "Café");
    }

    #[test]
    fn windows_1252_quotes_are_decoded() {
        assert_eq!(decode_bytes(b"\x93quoted\x94", None), "\u{201c}quoted\u{201d}");
    }

    #[test]
    fn unknown_charset_label_is_ignored() {
        assert_eq!(decode_bytes(b"plain", Some("x-made-up")), "plain");
    }

    #[test]
    fn numeric_entities_are_decoded() {
        assert_eq!(strip_html("It&#8217;s &#x2014; ok"), "It\u{2019}s \u{2014} ok");
    }

    #[test]
    fn raw_parts_keep_markup() {
        let msg = message(vec![
            MimePart::new("text/html", r#"<a href="https://example.com/a">A</a>"#),
            MimePart::new("image/gif", vec![1u8]),
        ]);
        let raw = ContentExtractor::raw_text_parts(&msg);
        assert_eq!(raw.len(), 1);
        assert!(raw[0].contains("href"));
    }
}
