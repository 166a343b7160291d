//! Keyword-triggered elaborations for the local script heuristic
//!
//! An ordered list of (predicate, sentence) pairs. The first rule whose
//! predicate holds for a paragraph contributes its sentence; later rules are
//! not consulted. This is template lookup, not text generation.

use std::collections::HashSet;

use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// One table row as it appears in configuration
///
/// A rule with both lists requires every `all` keyword and at least one `any`
/// keyword. Keywords match whole words, case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElaborationRule {
    /// Keywords that must all be present
    #[serde(default)]
    pub all: Vec<String>,
    /// Keywords of which one must be present
    #[serde(default)]
    pub any: Vec<String>,
    /// Sentence appended after the paragraph
    pub template: String,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    all: Vec<usize>,
    any: Vec<usize>,
    template: String,
}

impl CompiledRule {
    fn holds(&self, present: &HashSet<usize>) -> bool {
        let all_ok = self.all.iter().all(|id| present.contains(id));
        let any_ok = self.any.is_empty() || self.any.iter().any(|id| present.contains(id));
        all_ok && any_ok
    }
}

/// Compiled, ordered elaboration table
#[derive(Debug, Clone, Default)]
pub struct ElaborationTable {
    matcher: Option<AhoCorasick>,
    keywords: Vec<String>,
    rules: Vec<CompiledRule>,
}

impl ElaborationTable {
    /// Compile configured rules, preserving order
    pub fn new(rules: &[ElaborationRule]) -> Result<Self, ApplicationError> {
        let mut keywords: Vec<String> = Vec::new();
        let mut intern = |word: &str| -> usize {
            let word = word.trim().to_lowercase();
            keywords.iter().position(|k| *k == word).unwrap_or_else(|| {
                keywords.push(word);
                keywords.len() - 1
            })
        };

        let mut compiled = Vec::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            let all: Vec<usize> = rule
                .all
                .iter()
                .filter(|k| !k.trim().is_empty())
                .map(|k| intern(k))
                .collect();
            let any: Vec<usize> = rule
                .any
                .iter()
                .filter(|k| !k.trim().is_empty())
                .map(|k| intern(k))
                .collect();
            if all.is_empty() && any.is_empty() {
                return Err(ApplicationError::Configuration(format!(
                    "elaboration rule {} has no keywords",
                    index + 1
                )));
            }
            if rule.template.trim().is_empty() {
                return Err(ApplicationError::Configuration(format!(
                    "elaboration rule {} has an empty template",
                    index + 1
                )));
            }
            compiled.push(CompiledRule {
                all,
                any,
                template: rule.template.trim().to_string(),
            });
        }

        let matcher = if keywords.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .match_kind(MatchKind::Standard)
                    .build(&keywords)
                    .map_err(|e| {
                        ApplicationError::Configuration(format!("elaboration keywords: {e}"))
                    })?,
            )
        };

        Ok(Self {
            matcher,
            keywords,
            rules: compiled,
        })
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sentence for the first rule that holds, if any
    pub fn elaborate(&self, text: &str) -> Option<&str> {
        let present = self.present_keywords(text);
        if present.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.holds(&present))
            .map(|rule| rule.template.as_str())
    }

    fn present_keywords(&self, text: &str) -> HashSet<usize> {
        let Some(matcher) = &self.matcher else {
            return HashSet::new();
        };
        let bytes = text.as_bytes();
        matcher
            .find_overlapping_iter(text)
            .filter(|m| {
                let before = m.start().checked_sub(1).map(|i| bytes[i]);
                let after = bytes.get(m.end()).copied();
                !before.is_some_and(is_word_byte) && !after.is_some_and(is_word_byte)
            })
            .map(|m| m.pattern().as_usize())
            .filter(|id| *id < self.keywords.len())
            .collect()
    }
}

const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
