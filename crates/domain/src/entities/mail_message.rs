//! Mail message entity
//!
//! A fetched email with its decoded headers and the raw MIME part tree.
//! Messages are constructed once per fetch and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::MessageUid;

/// Whether a MIME part is shown inline or offered as a download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartDisposition {
    /// Rendered as part of the message body
    #[default]
    Inline,
    /// Attached file
    Attachment,
}

/// One typed chunk of a (possibly multipart) message body
///
/// `body` holds the transfer-decoded bytes (base64 and quoted-printable are
/// already undone) but no charset decoding has happened yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimePart {
    content_type: String,
    charset: Option<String>,
    disposition: PartDisposition,
    body: Vec<u8>,
    children: Vec<Self>,
}

impl MimePart {
    /// Create a leaf part; the content type is normalized to lowercase
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into().trim().to_ascii_lowercase(),
            charset: None,
            disposition: PartDisposition::Inline,
            body: body.into(),
            children: Vec::new(),
        }
    }

    /// Create a `multipart/*` container holding the given children
    pub fn multipart(subtype: &str, children: Vec<Self>) -> Self {
        Self {
            content_type: format!("multipart/{}", subtype.to_ascii_lowercase()),
            charset: None,
            disposition: PartDisposition::Inline,
            body: Vec::new(),
            children,
        }
    }

    /// Set the declared charset
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into().trim().to_ascii_lowercase());
        self
    }

    /// Mark this part as an attachment
    #[must_use]
    pub const fn as_attachment(mut self) -> Self {
        self.disposition = PartDisposition::Attachment;
        self
    }

    /// Lowercase MIME type, e.g. `text/plain`
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Declared charset, if any
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Part disposition
    pub const fn disposition(&self) -> PartDisposition {
        self.disposition
    }

    /// Transfer-decoded body bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Nested parts (only non-empty for multipart containers)
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Whether this part is a multipart container
    pub fn is_multipart(&self) -> bool {
        self.content_type.starts_with("multipart/")
    }

    /// Whether this is an inline part of the given MIME type
    pub fn is_inline(&self, mime_type: &str) -> bool {
        self.disposition == PartDisposition::Inline && self.content_type == mime_type
    }
}

/// Depth-first, pre-order iterator over a part tree
#[derive(Debug)]
pub struct DepthFirstParts<'a> {
    stack: Vec<&'a MimePart>,
}

impl<'a> DepthFirstParts<'a> {
    fn new(roots: &'a [MimePart]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for DepthFirstParts<'a> {
    type Item = &'a MimePart;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        self.stack.extend(part.children.iter().rev());
        Some(part)
    }
}

/// A fetched email message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    uid: MessageUid,
    subject: String,
    sender: String,
    sender_name: Option<String>,
    received_at: DateTime<Utc>,
    seen: bool,
    parts: Vec<MimePart>,
}

impl MailMessage {
    /// Create a message without body parts
    ///
    /// The sender address is stored trimmed and lowercased.
    pub fn new(
        uid: impl Into<MessageUid>,
        subject: impl Into<String>,
        sender: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            subject: subject.into(),
            sender: sender.into().trim().to_lowercase(),
            sender_name: None,
            received_at,
            seen: false,
            parts: Vec::new(),
        }
    }

    /// Set the display name of the sender
    #[must_use]
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.sender_name = (!name.trim().is_empty()).then(|| name.trim().to_string());
        self
    }

    /// Record whether the server reported the `\Seen` flag
    #[must_use]
    pub const fn with_seen(mut self, seen: bool) -> Self {
        self.seen = seen;
        self
    }

    /// Append a top-level MIME part
    #[must_use]
    pub fn with_part(mut self, part: MimePart) -> Self {
        self.parts.push(part);
        self
    }

    /// Server-assigned identifier
    pub const fn uid(&self) -> MessageUid {
        self.uid
    }

    /// Decoded subject line
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Bare sender address, lowercase
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Sender display name, if the From header carried one
    pub fn sender_name(&self) -> Option<&str> {
        self.sender_name.as_deref()
    }

    /// When the message was received
    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Whether the message was already marked as read when fetched
    pub const fn is_seen(&self) -> bool {
        self.seen
    }

    /// Top-level MIME parts in message order
    pub fn parts(&self) -> &[MimePart] {
        &self.parts
    }

    /// Walk every MIME part depth-first, containers before their children
    pub fn walk_parts(&self) -> DepthFirstParts<'_> {
        DepthFirstParts::new(&self.parts)
    }
}
