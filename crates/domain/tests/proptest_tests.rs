//! Property-based tests for domain invariants

use chrono::{Duration, TimeZone, Utc};
use domain::{
    MailMessage, NewsletterProfile, PodcastScript, SPEAKING_RATE_WPM, ScriptOrigin,
    estimate_duration_minutes,
};
use proptest::prelude::*;

// ============================================================================
// PodcastScript Property Tests
// ============================================================================

mod podcast_script_tests {
    use super::*;

    proptest! {
        #[test]
        fn duration_is_never_zero(words in 0usize..10_000) {
            prop_assert!(estimate_duration_minutes(words) >= 1);
        }

        #[test]
        fn duration_matches_rounded_rate(words in SPEAKING_RATE_WPM..20_000) {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let expected = (words as f64 / SPEAKING_RATE_WPM as f64).round() as u32;
            prop_assert_eq!(estimate_duration_minutes(words), expected);
        }

        #[test]
        fn metadata_is_derived_from_text(words in proptest::collection::vec("[a-z]{1,8}", 1..400)) {
            let text = words.join(" ");
            let script = PodcastScript::new(text, ScriptOrigin::Local);
            prop_assert_eq!(script.word_count(), words.len());
            prop_assert_eq!(script.duration_minutes(), estimate_duration_minutes(words.len()));
        }
    }
}

// ============================================================================
// NewsletterProfile Property Tests
// ============================================================================

mod newsletter_profile_tests {
    use super::*;

    fn profile(max_age_hours: u32) -> NewsletterProfile {
        NewsletterProfile::new("mando_minutes")
            .with_sender("news@mandominutes.com")
            .with_subject("Mando Minutes")
            .with_max_age_hours(max_age_hours)
    }

    proptest! {
        #[test]
        fn messages_inside_window_match(max_age in 1u32..240, minutes_ago in 0i64..60) {
            let now = Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap();
            let age = Duration::hours(i64::from(max_age)) - Duration::minutes(minutes_ago + 1);
            let msg = MailMessage::new(1, "Mando Minutes: 7 July", "news@mandominutes.com", now - age);
            prop_assert!(profile(max_age).matches(&msg, now));
        }

        #[test]
        fn messages_outside_window_never_match(max_age in 1u32..240, extra_minutes in 1i64..10_000) {
            let now = Utc.with_ymd_and_hms(2025, 7, 7, 12, 0, 0).unwrap();
            let age = Duration::hours(i64::from(max_age)) + Duration::minutes(extra_minutes);
            let msg = MailMessage::new(1, "Mando Minutes: 7 July", "news@mandominutes.com", now - age);
            prop_assert!(!profile(max_age).matches(&msg, now));
        }

        #[test]
        fn subject_match_ignores_case(prefix in "[a-zA-Z ]{0,10}", suffix in "[a-zA-Z0-9 ]{0,10}") {
            let subject = format!("{prefix}mAnDo MiNuTeS{suffix}");
            prop_assert!(profile(24).matches_subject(&subject));
        }
    }
}
