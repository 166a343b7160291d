//! RFC 822 message parsing into domain mail messages

use chrono::{DateTime, Utc};
use domain::{MailMessage, MessageUid, MimePart};
use mailparse::{DispositionType, MailAddr, MailHeaderMap, ParsedMail};
use tracing::{debug, warn};

use crate::error::MailError;

/// Parse a raw message
///
/// The receipt time is the server's INTERNALDATE when known. Without one the
/// `Date` header is used, and `fallback_received_at` when that is missing or
/// unparseable.
pub fn parse_message(
    uid: MessageUid,
    raw: &[u8],
    internal_date: Option<DateTime<Utc>>,
    fallback_received_at: DateTime<Utc>,
) -> Result<MailMessage, MailError> {
    let parsed = mailparse::parse_mail(raw)?;

    let subject = parsed
        .headers
        .get_first_value("Subject")
        .unwrap_or_default();
    let (sender, sender_name) = parse_sender(&parsed);
    let received_at = internal_date
        .or_else(|| {
            parsed
                .headers
                .get_first_value("Date")
                .and_then(|value| parse_date(&value))
        })
        .unwrap_or(fallback_received_at);

    debug!(uid = %uid, subject = %subject, sender = %sender, "Parsed message");

    let mut message = MailMessage::new(uid, subject, sender, received_at).with_part(convert_part(&parsed));
    if let Some(name) = sender_name {
        message = message.with_sender_name(name);
    }
    Ok(message)
}

/// Parse an RFC 2822 date into UTC
///
/// `mailparse::dateparse` yields 0 rather than an error for text it cannot
/// read, so non-positive timestamps count as unparseable.
#[must_use]
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    mailparse::dateparse(value)
        .ok()
        .filter(|ts| *ts > 0)
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
}

/// Address and display name of the first `From` mailbox
fn parse_sender(parsed: &ParsedMail<'_>) -> (String, Option<String>) {
    let Some(header) = parsed.headers.get_first_header("From") else {
        return (String::new(), None);
    };

    match mailparse::addrparse_header(header) {
        Ok(list) => {
            let first = list.iter().find_map(|addr| match addr {
                MailAddr::Single(info) => Some(info.clone()),
                MailAddr::Group(group) => group.addrs.first().cloned(),
            });
            first.map_or_else(
                || (String::new(), None),
                |info| (info.addr, info.display_name),
            )
        },
        Err(e) => {
            let value = header.get_value();
            warn!(error = %e, from = %value, "Unparseable From header, using raw value");
            (bracketed_address(&value).unwrap_or(value), None)
        },
    }
}

/// The text between the last `<` and the following `>`
fn bracketed_address(value: &str) -> Option<String> {
    let start = value.rfind('<')? + 1;
    let end = value[start..].find('>')? + start;
    Some(value[start..end].to_string())
}

fn convert_part(part: &ParsedMail<'_>) -> MimePart {
    let mimetype = part.ctype.mimetype.as_str();

    if let Some(subtype) = mimetype.strip_prefix("multipart/") {
        let children = part.subparts.iter().map(convert_part).collect();
        return MimePart::multipart(subtype, children);
    }

    // Transfer decoding only; charset decoding is left to the extractor
    let body = part.get_body_raw().unwrap_or_else(|e| {
        warn!(error = %e, content_type = %mimetype, "Undecodable part body, dropping it");
        Vec::new()
    });

    let mut converted = MimePart::new(mimetype, body);
    if let Some(charset) = part.ctype.params.get("charset") {
        converted = converted.with_charset(charset.clone());
    }
    if part.get_content_disposition().disposition == DispositionType::Attachment {
        converted = converted.as_attachment();
    }
    converted
}
