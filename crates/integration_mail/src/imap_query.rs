//! IMAP `SEARCH` criteria rendering
//!
//! Turns a date bound plus sender and subject alternatives into RFC 3501
//! search syntax: `SINCE <date>` conjoined with nested `OR` groups.

use chrono::NaiveDate;

/// Search criteria before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Inclusive date lower bound
    pub since: NaiveDate,
    /// `FROM` alternatives
    pub senders: Vec<String>,
    /// `SUBJECT` alternatives
    pub subjects: Vec<String>,
}

impl SearchCriteria {
    /// Render to IMAP search syntax
    ///
    /// Empty alternative lists are left out rather than rendered as an
    /// always-false group.
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts = vec![format!("SINCE {}", imap_date(self.since))];
        if let Some(group) = any_of("FROM", &self.senders) {
            parts.push(group);
        }
        if let Some(group) = any_of("SUBJECT", &self.subjects) {
            parts.push(group);
        }
        parts.join(" ")
    }
}

/// `dd-Mon-yyyy` with English month abbreviations
#[must_use]
pub fn imap_date(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}

/// Quote a search string, escaping backslashes and double quotes
#[must_use]
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            },
            // CR and LF are not allowed in quoted strings
            '\r' | '\n' => quoted.push(' '),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// `OR` is binary in IMAP, so n alternatives nest to the right:
/// `OR k a OR k b k c`
fn any_of(key: &str, values: &[String]) -> Option<String> {
    let terms: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| format!("{key} {}", quote(v)))
        .collect();

    let (last, rest) = terms.split_last()?;
    Some(
        rest.iter()
            .rev()
            .fold(last.clone(), |acc, term| format!("OR {term} {acc}")),
    )
}
