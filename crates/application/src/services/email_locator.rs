//! Email locator - Finds the most recent issue of a newsletter
//!
//! Each lookup runs in its own mailbox session that is logged out on every
//! exit path. Zero matches is a normal outcome (`Ok(None)`), not an error.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use domain::{MailMessage, MessageUid, NewsletterProfile};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{MailboxPort, MailboxSession, SearchQuery},
};

/// Locator settings
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Folder searched for newsletters
    pub folder: String,
    /// Retry once with the date bound moved back a day on zero matches
    pub relax_date_bound: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            folder: "INBOX".to_string(),
            relax_date_bound: true,
        }
    }
}

/// Finds newsletter issues in a mailbox
pub struct EmailLocator {
    mailbox: Arc<dyn MailboxPort>,
    config: LocatorConfig,
}

impl fmt::Debug for EmailLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailLocator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EmailLocator {
    /// Create a locator
    pub fn new(mailbox: Arc<dyn MailboxPort>, config: LocatorConfig) -> Self {
        Self { mailbox, config }
    }

    /// Return the newest message matching the profile, if any
    ///
    /// Read state is ignored: a message already marked seen is still eligible.
    #[instrument(skip(self, profile), fields(profile = %profile.name))]
    pub async fn locate(
        &self,
        profile: &NewsletterProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<MailMessage>, ApplicationError> {
        let mut session = self.mailbox.open().await?;
        let result = self.locate_in(session.as_mut(), profile, now).await;
        close(session.as_mut()).await;
        result
    }

    /// Set `\Seen` on a message in a fresh session
    #[instrument(skip(self))]
    pub async fn mark_seen(&self, uid: MessageUid) -> Result<(), ApplicationError> {
        let mut session = self.mailbox.open().await?;
        let result = async {
            session.select_folder(&self.config.folder).await?;
            session.mark_seen(uid).await
        }
        .await;
        close(session.as_mut()).await;
        result
    }

    /// Open and close a session without searching
    pub async fn check_connection(&self) -> Result<(), ApplicationError> {
        let mut session = self.mailbox.open().await?;
        let result = session.select_folder(&self.config.folder).await;
        close(session.as_mut()).await;
        result
    }

    async fn locate_in(
        &self,
        session: &mut dyn MailboxSession,
        profile: &NewsletterProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<MailMessage>, ApplicationError> {
        session.select_folder(&self.config.folder).await?;

        let query = SearchQuery::for_profile(profile, now);
        let mut uids = session.search(&query).await?;
        debug!(since = %query.since, hits = uids.len(), "Searched mailbox");

        let mut relaxed = false;
        if uids.is_empty() && self.config.relax_date_bound {
            relaxed = true;
            let wider = query.relaxed_by_days(1);
            uids = session.search(&wider).await?;
            debug!(since = %wider.since, hits = uids.len(), "Searched with relaxed date bound");
        }

        let Some(latest) = uids.into_iter().max() else {
            info!("📭 No matching newsletter found");
            return Ok(None);
        };

        let message = session.fetch(latest).await?;
        // A relaxed hit is judged against a window widened by the same day
        let cutoff = profile.age_cutoff(now) - Duration::days(i64::from(relaxed));
        let matches = profile.matches_sender(message.sender())
            && profile.matches_subject(message.subject())
            && message.received_at() >= cutoff;
        if !matches {
            info!(
                uid = %latest,
                sender = %message.sender(),
                received_at = %message.received_at(),
                "📭 Newest candidate is outside the profile's sender set or age window"
            );
            return Ok(None);
        }

        info!(
            uid = %latest,
            subject = %message.subject(),
            seen = message.is_seen(),
            "📬 Found newsletter"
        );
        Ok(Some(message))
    }
}

async fn close(session: &mut dyn MailboxSession) {
    if let Err(e) = session.logout().await {
        warn!(error = %e, "⚠️ Mailbox logout failed");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone};

    use super::*;
    use crate::ports::{MockMailboxPort, MockMailboxSession};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap()
    }

    fn profile() -> NewsletterProfile {
        NewsletterProfile::new("mando_minutes")
            .with_sender("news@mandominutes.com")
            .with_subject("Mando Minutes")
            .with_max_age_hours(24)
    }

    fn issue(uid: u32, hours_ago: i64) -> MailMessage {
        MailMessage::new(
            uid,
            "Mando Minutes: 7 July",
            "news@mandominutes.com",
            now() - Duration::hours(hours_ago),
        )
    }

    fn port_with(session: MockMailboxSession) -> Arc<dyn MailboxPort> {
        let mut port = MockMailboxPort::new();
        port.expect_open()
            .return_once(move || Ok(Box::new(session) as Box<dyn MailboxSession>));
        Arc::new(port)
    }

    fn session_expecting_logout() -> MockMailboxSession {
        let mut session = MockMailboxSession::new();
        session
            .expect_select_folder()
            .withf(|folder| folder == "INBOX")
            .returning(|_| Ok(()));
        session.expect_logout().times(1).returning(|| Ok(()));
        session
    }

    #[tokio::test]
    async fn returns_highest_uid() {
        let mut session = session_expecting_logout();
        session
            .expect_search()
            .returning(|_| Ok(vec![MessageUid::new(12), MessageUid::new(40), MessageUid::new(7)]));
        session
            .expect_fetch()
            .withf(|uid| *uid == MessageUid::new(40))
            .returning(|uid| Ok(issue(uid.value(), 2)));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        let found = locator.locate(&profile(), now()).await.unwrap();
        assert_eq!(found.map(|m| m.uid()), Some(MessageUid::new(40)));
    }

    #[tokio::test]
    async fn message_23_hours_old_is_returned() {
        let mut session = session_expecting_logout();
        session
            .expect_search()
            .returning(|_| Ok(vec![MessageUid::new(5)]));
        session.expect_fetch().returning(|_| Ok(issue(5, 23)));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        assert!(locator.locate(&profile(), now()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn message_25_hours_old_is_not_returned() {
        let mut session = session_expecting_logout();
        session
            .expect_search()
            .returning(|_| Ok(vec![MessageUid::new(5)]));
        session.expect_fetch().returning(|_| Ok(issue(5, 25)));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        assert!(locator.locate(&profile(), now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seen_messages_are_still_eligible() {
        let mut session = session_expecting_logout();
        session
            .expect_search()
            .returning(|_| Ok(vec![MessageUid::new(5)]));
        session
            .expect_fetch()
            .returning(|_| Ok(issue(5, 1).with_seen(true)));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        let found = locator.locate(&profile(), now()).await.unwrap();
        assert!(found.is_some_and(|m| m.is_seen()));
    }

    #[tokio::test]
    async fn relaxed_search_result_is_returned() {
        let strict_since = NaiveDate::from_ymd_opt(2025, 7, 6).unwrap();
        let relaxed_since = NaiveDate::from_ymd_opt(2025, 7, 5).unwrap();

        let mut session = session_expecting_logout();
        session
            .expect_search()
            .withf(move |q| q.since == strict_since)
            .times(1)
            .returning(|_| Ok(Vec::new()));
        session
            .expect_search()
            .withf(move |q| q.since == relaxed_since)
            .times(1)
            .returning(|_| Ok(vec![MessageUid::new(9)]));
        session.expect_fetch().returning(|_| Ok(issue(9, 40)));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        let found = locator.locate(&profile(), now()).await.unwrap();
        assert_eq!(found.map(|m| m.uid()), Some(MessageUid::new(9)));
    }

    #[tokio::test]
    async fn relaxed_hit_beyond_widened_window_is_not_returned() {
        let strict_since = NaiveDate::from_ymd_opt(2025, 7, 6).unwrap();
        let mut session = session_expecting_logout();
        session
            .expect_search()
            .withf(move |q| q.since == strict_since)
            .returning(|_| Ok(Vec::new()));
        session
            .expect_search()
            .withf(move |q| q.since != strict_since)
            .returning(|_| Ok(vec![MessageUid::new(9)]));
        session.expect_fetch().returning(|_| Ok(issue(9, 49)));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        assert!(locator.locate(&profile(), now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zero_matches_after_relaxation_is_not_an_error() {
        let mut session = session_expecting_logout();
        session
            .expect_search()
            .times(2)
            .returning(|_| Ok(Vec::new()));
        session.expect_fetch().never();

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        assert!(locator.locate(&profile(), now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn relaxation_can_be_disabled() {
        let mut session = session_expecting_logout();
        session
            .expect_search()
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let config = LocatorConfig {
            relax_date_bound: false,
            ..LocatorConfig::default()
        };
        let locator = EmailLocator::new(port_with(session), config);
        assert!(locator.locate(&profile(), now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_is_logged_out_when_search_fails() {
        let mut session = session_expecting_logout();
        session
            .expect_search()
            .returning(|_| Err(ApplicationError::Mailbox("BAD command".into())));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        let err = locator.locate(&profile(), now()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Mailbox(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_reported() {
        let mut port = MockMailboxPort::new();
        port.expect_open()
            .returning(|| Err(ApplicationError::Transport("connection refused".into())));

        let locator = EmailLocator::new(Arc::new(port), LocatorConfig::default());
        let err = locator.locate(&profile(), now()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Transport(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn logout_failure_does_not_hide_result() {
        let mut session = MockMailboxSession::new();
        session.expect_select_folder().returning(|_| Ok(()));
        session
            .expect_search()
            .returning(|_| Ok(vec![MessageUid::new(3)]));
        session.expect_fetch().returning(|_| Ok(issue(3, 1)));
        session
            .expect_logout()
            .returning(|| Err(ApplicationError::Mailbox("BYE".into())));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        assert!(locator.locate(&profile(), now()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn mark_seen_uses_own_session() {
        let mut session = session_expecting_logout();
        session
            .expect_mark_seen()
            .withf(|uid| *uid == MessageUid::new(77))
            .times(1)
            .returning(|_| Ok(()));

        let locator = EmailLocator::new(port_with(session), LocatorConfig::default());
        locator.mark_seen(MessageUid::new(77)).await.unwrap();
    }

    #[test]
    fn debug_output() {
        let locator = EmailLocator::new(Arc::new(MockMailboxPort::new()), LocatorConfig::default());
        assert!(format!("{locator:?}").contains("INBOX"));
    }
}
