//! Mailbox port - Interface for reading newsletters from a mail server

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use domain::{MailMessage, MessageUid, NewsletterProfile};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Structured boolean search over sender, subject and date
///
/// Matches messages received on or after `since` whose sender is any of
/// `senders` and whose subject contains any of `subjects`. Rendering this into
/// a wire syntax is the adapter's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Date lower bound (inclusive, day granularity)
    pub since: NaiveDate,
    /// Sender alternatives
    pub senders: Vec<String>,
    /// Subject substring alternatives
    pub subjects: Vec<String>,
}

impl SearchQuery {
    /// Build the query for a profile's age window
    pub fn for_profile(profile: &NewsletterProfile, now: DateTime<Utc>) -> Self {
        Self {
            since: profile.age_cutoff(now).date_naive(),
            senders: profile.senders.iter().cloned().collect(),
            subjects: profile.subject_contains.clone(),
        }
    }

    /// Same query with the date bound moved back by `days`
    #[must_use]
    pub fn relaxed_by_days(&self, days: u64) -> Self {
        Self {
            since: self.since.checked_sub_days(Days::new(days)).unwrap_or(self.since),
            ..self.clone()
        }
    }
}

/// An open, authenticated mailbox connection
///
/// Sessions are scoped: whoever opens one must call [`MailboxSession::logout`]
/// on every exit path.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailboxSession: Send {
    /// Select a folder for subsequent commands
    async fn select_folder(&mut self, folder: &str) -> Result<(), ApplicationError>;

    /// Run a search in the selected folder
    ///
    /// Returns identifiers in server order. The search does not filter on
    /// read state.
    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<MessageUid>, ApplicationError>;

    /// Fetch one message in full
    async fn fetch(&mut self, uid: MessageUid) -> Result<MailMessage, ApplicationError>;

    /// Set the `\Seen` flag on a message
    async fn mark_seen(&mut self, uid: MessageUid) -> Result<(), ApplicationError>;

    /// Close the session
    async fn logout(&mut self) -> Result<(), ApplicationError>;
}

/// Factory for mailbox sessions
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailboxPort: Send + Sync {
    /// Connect and authenticate
    ///
    /// Connection and authentication failures are reported as
    /// [`ApplicationError::Transport`].
    async fn open(&self) -> Result<Box<dyn MailboxSession>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn query_uses_profile_window() {
        let profile = NewsletterProfile::new("mando")
            .with_sender("news@mandominutes.com")
            .with_subject("Mando Minutes");
        let now = Utc.with_ymd_and_hms(2025, 7, 7, 6, 0, 0).unwrap();

        let query = SearchQuery::for_profile(&profile, now);
        assert_eq!(query.since, NaiveDate::from_ymd_opt(2025, 7, 6).unwrap());
        assert_eq!(query.senders, vec!["news@mandominutes.com".to_string()]);
        assert_eq!(query.subjects, vec!["Mando Minutes".to_string()]);
    }

    #[test]
    fn relaxation_moves_date_back() {
        let query = SearchQuery {
            since: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            senders: vec!["a@b.c".into()],
            subjects: vec!["x".into()],
        };
        let relaxed = query.relaxed_by_days(1);
        assert_eq!(relaxed.since, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
        assert_eq!(relaxed.senders, query.senders);
    }
}
