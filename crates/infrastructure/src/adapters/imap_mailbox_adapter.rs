//! IMAP mailbox adapter - Implements MailboxPort using integration_mail

use application::{
    error::ApplicationError,
    ports::{MailboxPort, MailboxSession, SearchQuery},
};
use async_trait::async_trait;
use domain::{MailMessage, MessageUid};
use integration_mail::{ImapConfig, ImapConnection, ImapMailbox, MailError, SearchCriteria};
use tracing::{debug, instrument};

/// Opens IMAP sessions for the newsletter mailbox
#[derive(Debug, Clone)]
pub struct ImapMailboxAdapter {
    mailbox: ImapMailbox,
}

impl ImapMailboxAdapter {
    /// Create a new adapter with the given configuration
    #[must_use]
    pub const fn new(config: ImapConfig) -> Self {
        Self {
            mailbox: ImapMailbox::new(config),
        }
    }

    /// Map mail errors to application errors
    ///
    /// Failures before or during login are transport failures; everything
    /// after belongs to the established session.
    fn map_error(e: MailError) -> ApplicationError {
        if e.is_transport() {
            ApplicationError::Transport(e.to_string())
        } else {
            ApplicationError::Mailbox(e.to_string())
        }
    }

    fn criteria(query: &SearchQuery) -> SearchCriteria {
        SearchCriteria {
            since: query.since,
            senders: query.senders.clone(),
            subjects: query.subjects.clone(),
        }
    }
}

#[async_trait]
impl MailboxPort for ImapMailboxAdapter {
    #[instrument(skip(self))]
    async fn open(&self) -> Result<Box<dyn MailboxSession>, ApplicationError> {
        let connection = self.mailbox.connect().await.map_err(Self::map_error)?;
        Ok(Box::new(ImapSessionAdapter { connection }))
    }
}

/// One authenticated IMAP session
#[derive(Debug)]
struct ImapSessionAdapter {
    connection: ImapConnection,
}

#[async_trait]
impl MailboxSession for ImapSessionAdapter {
    async fn select_folder(&mut self, folder: &str) -> Result<(), ApplicationError> {
        let exists = self
            .connection
            .select(folder)
            .await
            .map_err(ImapMailboxAdapter::map_error)?;
        debug!(folder, exists, "📂 Folder selected");
        Ok(())
    }

    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<MessageUid>, ApplicationError> {
        let uids = self
            .connection
            .search(&ImapMailboxAdapter::criteria(query))
            .await
            .map_err(ImapMailboxAdapter::map_error)?;
        Ok(uids.into_iter().map(MessageUid::new).collect())
    }

    async fn fetch(&mut self, uid: MessageUid) -> Result<MailMessage, ApplicationError> {
        self.connection
            .fetch(uid.value())
            .await
            .map_err(ImapMailboxAdapter::map_error)
    }

    async fn mark_seen(&mut self, uid: MessageUid) -> Result<(), ApplicationError> {
        self.connection
            .mark_seen(uid.value())
            .await
            .map_err(ImapMailboxAdapter::map_error)
    }

    async fn logout(&mut self) -> Result<(), ApplicationError> {
        self.connection
            .logout()
            .await
            .map_err(ImapMailboxAdapter::map_error)
    }
}
