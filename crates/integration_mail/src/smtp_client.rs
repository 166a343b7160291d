//! SMTP submission client
//!
//! A small async SMTP dialogue over tokio: STARTTLS or implicit TLS,
//! `AUTH PLAIN`, and one message per connection. Messages carry a text body
//! and at most one base64 attachment.

use base64::Engine;
use chrono::Utc;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tokio_native_tls::TlsConnector;
use tracing::{debug, error, info, instrument, trace};

use crate::{
    config::{SmtpConfig, SmtpSecurity},
    error::MailError,
    tls::build_native_tls_connector,
};

const BASE64_LINE_LEN: usize = 76;

/// A file attached to an outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    /// File name shown to the recipient
    pub filename: String,
    /// MIME type
    pub content_type: String,
    /// Raw bytes
    pub data: Vec<u8>,
}

/// An email ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Optional attachment
    pub attachment: Option<EmailAttachment>,
}

impl OutgoingEmail {
    /// Create a text-only email
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    /// Attach a file
    #[must_use]
    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// SMTP client
#[derive(Debug, Clone)]
pub struct SmtpSender {
    config: SmtpConfig,
}

struct Envelope<'a> {
    from: &'a str,
    to: &'a str,
    content: &'a str,
}

impl SmtpSender {
    /// Creates a new SMTP client with the given configuration
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Send an email; returns its `Message-ID`
    #[instrument(skip(self, email), fields(to = %email.to))]
    pub async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError> {
        validate_address(&self.config.username)?;
        validate_address(&email.to)?;

        let message_id = new_message_id(extract_domain(&self.config.username));
        let content = build_message(&self.config.username, email, &message_id);

        self.submit(Some(Envelope {
            from: &self.config.username,
            to: &email.to,
            content: &content,
        }))
        .await?;

        info!(message_id = %message_id, subject = %email.subject, "✉️ Email sent");
        Ok(message_id)
    }

    /// Connect and authenticate without sending
    #[instrument(skip(self))]
    pub async fn verify(&self) -> Result<(), MailError> {
        self.submit(None).await?;
        debug!("SMTP login verified");
        Ok(())
    }

    /// Check if the SMTP port accepts TCP connections
    pub async fn check_connection(&self) -> bool {
        TcpStream::connect(self.config.address()).await.is_ok()
    }

    async fn submit(&self, envelope: Option<Envelope<'_>>) -> Result<(), MailError> {
        let addr = self.config.address();
        let stream = TcpStream::connect(&addr).await.map_err(|e| {
            error!(error = %e, "Failed to connect to SMTP server");
            MailError::ConnectionFailed(format!("SMTP connection to {addr} failed: {e}"))
        })?;

        match self.config.security() {
            SmtpSecurity::ImplicitTls => {
                let tls = self.tls_connector()?;
                let tls_stream = tls
                    .connect(&self.config.host, stream)
                    .await
                    .map_err(|e| MailError::ConnectionFailed(format!("TLS handshake failed: {e}")))?;
                self.smtp_session(tls_stream, true, envelope).await
            },
            SmtpSecurity::StartTls => {
                let tls_stream = self.starttls(stream).await?;
                // no second greeting after STARTTLS
                self.smtp_session(tls_stream, false, envelope).await
            },
            SmtpSecurity::Plain => self.smtp_session(stream, true, envelope).await,
        }
    }

    fn tls_connector(&self) -> Result<TlsConnector, MailError> {
        Ok(TlsConnector::from(build_native_tls_connector(
            &self.config.tls,
        )?))
    }

    async fn starttls(
        &self,
        stream: TcpStream,
    ) -> Result<tokio_native_tls::TlsStream<TcpStream>, MailError> {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        expect_response(&mut reader, "220").await?;
        send_command(&mut writer, &format!("EHLO {}", ehlo_name())).await?;
        expect_response(&mut reader, "250").await?;
        send_command(&mut writer, "STARTTLS").await?;
        expect_response(&mut reader, "220").await?;

        let stream = reader.into_inner().unsplit(writer);
        self.tls_connector()?
            .connect(&self.config.host, stream)
            .await
            .map_err(|e| MailError::ConnectionFailed(format!("STARTTLS upgrade failed: {e}")))
    }

    async fn smtp_session<S>(
        &self,
        stream: S,
        read_greeting: bool,
        envelope: Option<Envelope<'_>>,
    ) -> Result<(), MailError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        if read_greeting {
            expect_response(&mut reader, "220").await?;
        }

        send_command(&mut writer, &format!("EHLO {}", ehlo_name())).await?;
        expect_response(&mut reader, "250").await?;

        let auth_string = format!("\0{}\0{}", self.config.username, self.config.password);
        let auth_b64 = base64::engine::general_purpose::STANDARD.encode(auth_string);
        send_command(&mut writer, &format!("AUTH PLAIN {auth_b64}")).await?;
        let auth_response = read_response(&mut reader).await?;
        if !auth_response.starts_with("235") {
            error!(response = %auth_response.trim(), "SMTP authentication rejected");
            return Err(MailError::AuthenticationFailed(
                auth_response.trim().to_string(),
            ));
        }

        if let Some(envelope) = envelope {
            send_command(&mut writer, &format!("MAIL FROM:<{}>", envelope.from)).await?;
            expect_response(&mut reader, "250").await?;

            send_command(&mut writer, &format!("RCPT TO:<{}>", envelope.to)).await?;
            expect_response(&mut reader, "25").await?;

            send_command(&mut writer, "DATA").await?;
            expect_response(&mut reader, "354").await?;

            let stuffed = dot_stuff(envelope.content);
            writer
                .write_all(stuffed.as_bytes())
                .await
                .map_err(|e| MailError::SmtpError(format!("Failed to send content: {e}")))?;
            writer
                .write_all(b"\r\n.\r\n")
                .await
                .map_err(|e| MailError::SmtpError(format!("Failed to end DATA: {e}")))?;
            writer.flush().await.ok();
            expect_response(&mut reader, "250").await?;
        }

        send_command(&mut writer, "QUIT").await?;
        // server may close without answering QUIT
        Ok(())
    }
}

async fn send_command<W>(writer: &mut W, command: &str) -> Result<(), MailError>
where
    W: AsyncWrite + Unpin,
{
    trace!(command = %command.split(' ').next().unwrap_or(command), "Sending SMTP command");
    writer
        .write_all(format!("{command}\r\n").as_bytes())
        .await
        .map_err(|e| MailError::SmtpError(format!("Failed to send command: {e}")))?;
    writer.flush().await.ok();
    Ok(())
}

/// Read a possibly multi-line reply (`250-...` continues, `250 ...` ends)
async fn read_response<R>(reader: &mut BufReader<R>) -> Result<String, MailError>
where
    R: AsyncRead + Unpin,
{
    let mut response = String::new();
    loop {
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| MailError::SmtpError(format!("Failed to read response: {e}")))?;
        if read == 0 {
            return Err(MailError::SmtpError(
                "Connection closed by server".to_string(),
            ));
        }

        trace!(line = %line.trim(), "SMTP response");
        response.push_str(&line);

        if line.len() < 4 || line.as_bytes()[3] != b'-' {
            break;
        }
    }
    Ok(response)
}

async fn expect_response<R>(reader: &mut BufReader<R>, expected_code: &str) -> Result<(), MailError>
where
    R: AsyncRead + Unpin,
{
    let response = read_response(reader).await?;
    if !response.starts_with(expected_code) {
        return Err(MailError::SmtpError(format!(
            "Expected {expected_code}, got: {}",
            response.trim()
        )));
    }
    Ok(())
}

fn ehlo_name() -> String {
    hostname::get().map_or_else(
        |_| "localhost".to_string(),
        |h| h.to_string_lossy().to_string(),
    )
}

fn validate_address(address: &str) -> Result<(), MailError> {
    match address.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(MailError::InvalidAddress(address.to_string())),
    }
}

fn extract_domain(email: &str) -> &str {
    email.split('@').nth(1).unwrap_or("newscast.local")
}

/// Lines starting with `.` get an extra `.`
fn dot_stuff(content: &str) -> String {
    let stuffed = content.replace("\r\n.", "\r\n..");
    if stuffed.starts_with('.') {
        format!(".{stuffed}")
    } else {
        stuffed
    }
}

/// RFC 2047 encoded-word for non-ASCII header values
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!(
            "=?UTF-8?B?{}?=",
            base64::engine::general_purpose::STANDARD.encode(value)
        )
    }
}

fn crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

fn wrapped_base64(data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    encoded
        .as_bytes()
        .chunks(BASE64_LINE_LEN)
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Render the RFC 5322 message
/// `<millis.uuid@domain>`
fn new_message_id(domain: &str) -> String {
    format!(
        "<{}.{}@{}>",
        Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4(),
        domain
    )
}

fn build_message(from: &str, email: &OutgoingEmail, message_id: &str) -> String {
    let headers = format!(
        "From: {from}\r\n\
         To: {}\r\n\
         Subject: {}\r\n\
         Date: {}\r\n\
         Message-ID: {message_id}\r\n\
         MIME-Version: 1.0\r\n",
        email.to,
        encode_header(&email.subject),
        Utc::now().to_rfc2822(),
    );
    let body = crlf(&email.body);

    let Some(attachment) = &email.attachment else {
        return format!(
            "{headers}Content-Type: text/plain; charset=utf-8\r\n\
             Content-Transfer-Encoding: 8bit\r\n\
             \r\n\
             {body}"
        );
    };

    let boundary = format!(
        "newscast-{}",
        message_id.trim_matches(|c| c == '<' || c == '>').replace('@', ".")
    );
    let filename = encode_header(&attachment.filename);
    format!(
        "{headers}Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\
         \r\n\
         --{boundary}\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         Content-Transfer-Encoding: 8bit\r\n\
         \r\n\
         {body}\r\n\
         --{boundary}\r\n\
         Content-Type: {}; name=\"{filename}\"\r\n\
         Content-Disposition: attachment; filename=\"{filename}\"\r\n\
         Content-Transfer-Encoding: base64\r\n\
         \r\n\
         {}\r\n\
         --{boundary}--",
        attachment.content_type,
        wrapped_base64(&attachment.data),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn podcast_email() -> OutgoingEmail {
        OutgoingEmail::new(
            "listener@example.com",
            "Mando Minutes Podcast",
            "Your episode is ready.\nEnjoy!",
        )
        .with_attachment(EmailAttachment {
            filename: "mando_minutes_20250707_063000.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            data: vec![0xFF; 100],
        })
    }

    #[test]
    fn text_only_message() {
        let email = OutgoingEmail::new("to@example.com", "Hello", "line one\nline two");
        let content = build_message("me@aol.com", &email, "<1@aol.com>");
        assert!(content.contains("From: me@aol.com\r\n"));
        assert!(content.contains("To: to@example.com\r\n"));
        assert!(content.contains("Message-ID: <1@aol.com>\r\n"));
        assert!(content.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(content.ends_with("\r\n\r\nline one\r\nline two"));
        assert!(!content.contains("multipart"));
    }

    #[test]
    fn attachment_message_round_trips_through_mailparse() {
        let content = build_message("me@aol.com", &podcast_email(), "<1@aol.com>");
        let parsed = mailparse::parse_mail(content.as_bytes()).unwrap();

        assert_eq!(parsed.ctype.mimetype, "multipart/mixed");
        assert_eq!(parsed.subparts.len(), 2);
        assert_eq!(
            parsed.subparts[0].get_body().unwrap().trim_end(),
            "Your episode is ready.\r\nEnjoy!"
        );
        let audio = &parsed.subparts[1];
        assert_eq!(audio.ctype.mimetype, "audio/mpeg");
        assert_eq!(audio.get_body_raw().unwrap(), vec![0xFF; 100]);
        assert_eq!(
            audio
                .get_content_disposition()
                .params
                .get("filename")
                .map(String::as_str),
            Some("mando_minutes_20250707_063000.mp3")
        );
    }

    #[test]
    fn base64_lines_are_wrapped() {
        let wrapped = wrapped_base64(&[0u8; 200]);
        assert!(wrapped.split("\r\n").all(|line| line.len() <= BASE64_LINE_LEN));
        assert!(wrapped.contains("\r\n"));
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        assert_eq!(encode_header("Plain"), "Plain");
        let encoded = encode_header("Café Brief");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn leading_dots_are_stuffed() {
        assert_eq!(dot_stuff(".start\r\n.mid\r\nend"), "..start\r\n..mid\r\nend");
    }

    #[test]
    fn address_validation() {
        assert!(validate_address("me@aol.com").is_ok());
        assert!(validate_address("me").is_err());
        assert!(validate_address("@aol.com").is_err());
        assert!(validate_address("me@localhost").is_err());
    }

    #[test]
    fn message_ids_are_unique_per_send() {
        let first = new_message_id("aol.com");
        let second = new_message_id("aol.com");
        assert_ne!(first, second);
        assert!(first.starts_with('<'));
        assert!(first.ends_with("@aol.com>"));
    }

    #[test]
    fn extract_domain_fallback() {
        assert_eq!(extract_domain("user@aol.com"), "aol.com");
        assert_eq!(extract_domain("invalid-email"), "newscast.local");
    }

    #[tokio::test]
    async fn invalid_recipient_fails_before_connecting() {
        let sender = SmtpSender::new(SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 19_999,
            username: "me@aol.com".to_string(),
            ..SmtpConfig::default()
        });
        let email = OutgoingEmail::new("not-an-address", "s", "b");
        assert!(matches!(
            sender.send(&email).await,
            Err(MailError::InvalidAddress(_))
        ));
    }
}
