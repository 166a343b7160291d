//! IMAP client
//!
//! Uses the synchronous `imap` crate; every command runs inside
//! `spawn_blocking` against a session shared through a mutex.

use std::{net::TcpStream, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use domain::{MailMessage, MessageUid};
use imap::Session;
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument};

use crate::{
    config::ImapConfig, error::MailError, imap_query::SearchCriteria,
    message_parser::parse_message, tls::build_native_tls_connector,
};

/// IMAP session over TLS
type ImapSession = Session<native_tls::TlsStream<TcpStream>>;

const IO_TIMEOUT: Duration = Duration::from_secs(60);

/// Entry point for opening IMAP connections
#[derive(Debug, Clone)]
pub struct ImapMailbox {
    config: ImapConfig,
}

impl ImapMailbox {
    /// Create a new client with the given configuration
    pub const fn new(config: ImapConfig) -> Self {
        Self { config }
    }

    /// Connect, negotiate TLS and log in
    #[instrument(skip(self), fields(host = %self.config.host))]
    pub async fn connect(&self) -> Result<ImapConnection, MailError> {
        let config = self.config.clone();
        let session = tokio::task::spawn_blocking(move || connect_sync(&config))
            .await
            .map_err(|e| MailError::ImapError(format!("Task join error: {e}")))??;

        info!("📬 Connected to IMAP server");
        Ok(ImapConnection {
            session: Arc::new(Mutex::new(Some(session))),
        })
    }

    /// Check if the IMAP port accepts TCP connections
    #[instrument(skip(self))]
    pub async fn check_connection(&self) -> bool {
        match tokio::net::TcpStream::connect(self.config.address()).await {
            Ok(_) => {
                debug!("IMAP server is reachable");
                true
            },
            Err(e) => {
                debug!(error = %e, "IMAP server is not reachable");
                false
            },
        }
    }
}

fn connect_sync(config: &ImapConfig) -> Result<ImapSession, MailError> {
    let addr = config.address();
    debug!(addr = %addr, "Connecting to IMAP server");

    let tcp_stream = TcpStream::connect(&addr).map_err(|e| {
        error!(error = %e, "Failed to connect to IMAP server");
        MailError::ConnectionFailed(format!("TCP connection to {addr} failed: {e}"))
    })?;
    tcp_stream
        .set_read_timeout(Some(IO_TIMEOUT))
        .and_then(|()| tcp_stream.set_write_timeout(Some(IO_TIMEOUT)))
        .map_err(|e| MailError::ConnectionFailed(format!("Failed to set socket timeout: {e}")))?;

    let tls = build_native_tls_connector(&config.tls)?;
    let tls_stream = tls.connect(&config.host, tcp_stream).map_err(|e| {
        error!(error = %e, "TLS handshake failed");
        MailError::ConnectionFailed(format!("TLS handshake failed: {e}"))
    })?;

    let mut client = imap::Client::new(tls_stream);
    client
        .read_greeting()
        .map_err(|e| MailError::ConnectionFailed(format!("No server greeting: {e}")))?;

    let session = client
        .login(&config.username, &config.password)
        .map_err(|(e, _client)| {
            error!(error = %e, user = %config.username, "IMAP login failed");
            MailError::AuthenticationFailed(e.to_string())
        })?;

    debug!("IMAP login successful");
    Ok(session)
}

/// An authenticated IMAP session
///
/// Call [`ImapConnection::logout`] when done; dropping the connection only
/// closes the socket.
#[derive(Clone)]
pub struct ImapConnection {
    session: Arc<Mutex<Option<ImapSession>>>,
}

impl std::fmt::Debug for ImapConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImapConnection")
            .field("open", &self.session.lock().is_some())
            .finish()
    }
}

impl ImapConnection {
    async fn with_session<T, F>(&self, op: F) -> Result<T, MailError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ImapSession) -> Result<T, MailError> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            let mut guard = session.lock();
            let session = guard.as_mut().ok_or(MailError::SessionClosed)?;
            op(session)
        })
        .await
        .map_err(|e| MailError::ImapError(format!("Task join error: {e}")))?
    }

    /// Select a folder; returns its message count
    #[instrument(skip(self))]
    pub async fn select(&self, folder: &str) -> Result<u32, MailError> {
        let folder = folder.to_string();
        self.with_session(move |session| {
            let mailbox = session.select(&folder).map_err(|e| match e {
                imap::Error::No(..) => MailError::MailboxNotFound(folder.clone()),
                other => MailError::ImapError(format!("SELECT {folder} failed: {other}")),
            })?;
            debug!(folder = %folder, exists = mailbox.exists, "Folder selected");
            Ok(mailbox.exists)
        })
        .await
    }

    /// Run `UID SEARCH`; results are sorted ascending
    #[instrument(skip(self, criteria))]
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<u32>, MailError> {
        let query = criteria.render();
        debug!(query = %query, "Searching");
        self.with_session(move |session| {
            let found = session
                .uid_search(&query)
                .map_err(|e| MailError::ImapError(format!("SEARCH failed: {e}")))?;
            let mut uids: Vec<u32> = found.into_iter().collect();
            uids.sort_unstable();
            Ok(uids)
        })
        .await
    }

    /// Fetch and parse one message without setting `\Seen`
    #[instrument(skip(self))]
    pub async fn fetch(&self, uid: u32) -> Result<MailMessage, MailError> {
        self.with_session(move |session| {
            let fetches = session
                .uid_fetch(uid.to_string(), "(UID INTERNALDATE BODY.PEEK[])")
                .map_err(|e| MailError::ImapError(format!("FETCH {uid} failed: {e}")))?;
            let fetch = fetches
                .iter()
                .find(|f| f.uid == Some(uid))
                .or_else(|| fetches.iter().next())
                .ok_or(MailError::MessageNotFound(uid))?;
            let raw = fetch.body().ok_or(MailError::MessageNotFound(uid))?;
            let internal_date = internal_date_utc(fetch.internal_date());
            parse_message(MessageUid::new(uid), raw, internal_date, Utc::now())
        })
        .await
    }

    /// Add `\Seen` to a message
    #[instrument(skip(self))]
    pub async fn mark_seen(&self, uid: u32) -> Result<(), MailError> {
        self.with_session(move |session| {
            session
                .uid_store(uid.to_string(), "+FLAGS (\\Seen)")
                .map_err(|e| match e {
                    imap::Error::No(..) => MailError::MessageNotFound(uid),
                    other => MailError::ImapError(format!("STORE {uid} failed: {other}")),
                })?;
            Ok(())
        })
        .await
    }

    /// Log out and close the session; later calls fail with
    /// [`MailError::SessionClosed`]
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), MailError> {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            let Some(mut session) = session.lock().take() else {
                return Ok(());
            };
            session
                .logout()
                .map_err(|e| MailError::ImapError(format!("LOGOUT failed: {e}")))
        })
        .await
        .map_err(|e| MailError::ImapError(format!("Task join error: {e}")))??;
        debug!("IMAP session closed");
        Ok(())
    }

    /// Whether the session is still open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }
}

/// Receipt time from an INTERNALDATE, if the server sent one
#[must_use]
pub fn internal_date_utc(date: Option<DateTime<chrono::FixedOffset>>) -> Option<DateTime<Utc>> {
    date.map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(port: u16) -> ImapConfig {
        ImapConfig {
            host: "127.0.0.1".to_string(),
            port,
            username: "reader@aol.com".to_string(),
            password: "app-password".to_string(),
            ..ImapConfig::default()
        }
    }

    #[tokio::test]
    async fn check_connection_fails_for_unavailable_server() {
        let client = ImapMailbox::new(test_config(19_999));
        assert!(!client.check_connection().await);
    }

    #[tokio::test]
    async fn connect_refused_is_connection_failure() {
        let client = ImapMailbox::new(test_config(19_999));
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, MailError::ConnectionFailed(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn closed_session_rejects_commands() {
        let connection = ImapConnection {
            session: Arc::new(Mutex::new(None)),
        };
        assert!(!connection.is_open());
        assert!(matches!(
            connection.select("INBOX").await,
            Err(MailError::SessionClosed)
        ));
        // logout on a closed session is a no-op
        assert!(connection.logout().await.is_ok());
    }

    #[test]
    fn internal_date_converts_to_utc() {
        let date = DateTime::parse_from_rfc3339("2025-07-07T06:30:00+02:00").unwrap();
        assert_eq!(
            internal_date_utc(Some(date)).unwrap().to_rfc3339(),
            "2025-07-07T04:30:00+00:00"
        );
        assert!(internal_date_utc(None).is_none());
    }
}
