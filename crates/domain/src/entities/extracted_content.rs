//! Extracted content entity

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of MIME part the text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// First `text/plain` part
    PlainText,
    /// First `text/html` part with tags stripped
    Html,
    /// No readable part was found
    None,
}

/// Why extraction is considered failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The message had neither a text nor an HTML part
    NoReadablePart,
    /// Text was found but is shorter than the configured minimum
    TooShort {
        /// Characters extracted
        chars: usize,
        /// Configured minimum
        minimum: usize,
    },
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReadablePart => write!(f, "no text or HTML part"),
            Self::TooShort { chars, minimum } => {
                write!(f, "extracted {chars} characters, minimum is {minimum}")
            },
        }
    }
}

/// Normalized plain text derived from a mail message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    text: String,
    source: ContentSource,
}

impl ExtractedContent {
    /// Content extracted from a readable part
    pub fn new(text: impl Into<String>, source: ContentSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    /// Empty content carrying the extraction-failure marker
    pub const fn unreadable() -> Self {
        Self {
            text: String::new(),
            source: ContentSource::None,
        }
    }

    /// The normalized text (possibly empty)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Where the text came from
    pub const fn source(&self) -> ContentSource {
        self.source
    }

    /// Length in characters
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether there is no text at all
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Classify the result against a minimum length
    ///
    /// `None` means the content is usable as-is.
    pub fn failure(&self, minimum_chars: usize) -> Option<ExtractionFailure> {
        if self.source == ContentSource::None {
            return Some(ExtractionFailure::NoReadablePart);
        }
        let chars = self.char_count();
        (chars < minimum_chars).then_some(ExtractionFailure::TooShort {
            chars,
            minimum: minimum_chars,
        })
    }

    /// Consume into the owned text
    pub fn into_text(self) -> String {
        self.text
    }
}
