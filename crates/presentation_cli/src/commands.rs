//! Subcommand handlers

use std::{path::Path, process::ExitCode, sync::Arc};

use anyhow::Context;
use application::{
    EmailLocator, PodcastReport, ProfileOutcome, RunSummary, ScriptRequest,
    error::ApplicationError,
    ports::{InferencePort, MailSenderPort, SpeechPort},
};
use chrono::Utc;
use domain::{MessageUid, NewsletterProfile, ScriptOrigin};
use infrastructure::{
    AppConfig, ConfigError, ImapMailboxAdapter, OpenAiInferenceAdapter, SpeechAdapter,
    build_extractor, build_mail_sender, build_pipeline, build_script_builder,
};
use tracing::info;

/// Exit status for configuration problems
pub const EXIT_CONFIG: u8 = 2;

/// Exit status for everything else that went wrong
pub const EXIT_FAILURE: u8 = 1;

/// Exit status for an error that ended a command
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    let is_config = err.downcast_ref::<ConfigError>().is_some()
        || matches!(
            err.downcast_ref::<ApplicationError>(),
            Some(ApplicationError::Configuration(_))
        );
    if is_config { EXIT_CONFIG } else { EXIT_FAILURE }
}

/// Process the selected profiles
pub async fn run(
    config: &AppConfig,
    names: &[String],
    all: bool,
    no_send: bool,
) -> anyhow::Result<ExitCode> {
    let deliver = !no_send;
    config.validate_for(deliver)?;

    let profiles = if all || names.is_empty() {
        config.enabled_profiles()
    } else {
        config.select_profiles(names)?
    };
    if profiles.is_empty() {
        return Err(ConfigError::Invalid(vec!["no enabled newsletter profiles".to_string()]).into());
    }

    let pipeline = build_pipeline(config, deliver)?;
    info!(profiles = profiles.len(), deliver, "🚀 Starting run");
    let summary = pipeline.run(&profiles).await;
    print_summary(&summary);

    Ok(match &summary.failure {
        None if summary.failed.is_empty() => ExitCode::SUCCESS,
        None => ExitCode::from(EXIT_FAILURE),
        Some(failure) if matches!(failure.error, ApplicationError::Configuration(_)) => {
            ExitCode::from(EXIT_CONFIG)
        },
        Some(_) => ExitCode::from(EXIT_FAILURE),
    })
}

fn print_summary(summary: &RunSummary) {
    for run in &summary.completed {
        match &run.outcome {
            ProfileOutcome::NothingToDo(reason) => {
                println!("⏭️  {}: nothing to do ({reason})", run.profile);
            },
            ProfileOutcome::Delivered(report) => print_report("✅", "delivered", report),
            ProfileOutcome::Generated(report) => print_report("📝", "generated", report),
        }
    }

    for failed in &summary.failed {
        println!("⚠️  {}: {}", failed.profile, failed.error);
    }

    if let Some(failure) = &summary.failure {
        println!("❌ {}: {}", failure.profile, failure.error);
        for name in &summary.skipped {
            println!("   ⏭️  {name}: not attempted");
        }
    }

    if summary.completed.len() > 1 || !summary.is_success() {
        println!(
            "\n📊 {} processed, {} delivered, {} failed, {} not attempted",
            summary.completed.len(),
            summary.delivered(),
            summary.failed.len() + usize::from(summary.failure.is_some()),
            summary.skipped.len()
        );
    }
}

fn print_report(icon: &str, verb: &str, report: &PodcastReport) {
    println!(
        "{icon} {}: {verb} \"{}\" ({} words, ~{} min, {})",
        report.profile,
        report.subject,
        report.word_count,
        report.duration_minutes,
        origin_label(&report.script_origin)
    );
    println!("   📝 Script: {}", report.script_path.display());
    match (&report.audio_path, &report.audio_missing) {
        (Some(path), _) => println!("   🔊 Audio: {}", path.display()),
        (None, Some(reason)) => println!("   ⚠️  No audio: {reason}"),
        (None, None) => {},
    }
    if let Some(path) = &report.articles_path {
        println!(
            "   📰 Articles: {} ({})",
            path.display(),
            report.article_count
        );
    }
    if let Some(failure) = &report.extraction_failure {
        println!("   ⚠️  Extraction: {failure}");
    }
    if report.marked_seen {
        println!("   👁️  Source message marked as read");
    }
}

fn origin_label(origin: &ScriptOrigin) -> String {
    match origin {
        ScriptOrigin::Remote { model } => format!("remote: {model}"),
        ScriptOrigin::Local => "local".to_string(),
        ScriptOrigin::Fallback => "fallback".to_string(),
    }
}

/// Probe every external dependency, one line each
pub async fn check(config: &AppConfig) -> anyhow::Result<ExitCode> {
    config.validate_for(false)?;
    let mut healthy = true;

    let mailbox = Arc::new(ImapMailboxAdapter::new(config.mailbox.to_imap_config()));
    let locator = EmailLocator::new(
        mailbox,
        config.pipeline.to_locator_config(&config.mailbox.folder),
    );
    match locator.check_connection().await {
        Ok(()) => println!(
            "✅ IMAP: {}@{}:{} ({})",
            config.mailbox.username,
            config.mailbox.imap_host,
            config.mailbox.imap_port,
            config.mailbox.folder
        ),
        Err(e) => {
            healthy = false;
            println!("❌ IMAP: {e}");
        },
    }

    match build_mail_sender(config) {
        Ok(sender) => match sender.verify().await {
            Ok(()) => println!(
                "✅ SMTP: {}:{}",
                config.delivery.smtp_host, config.delivery.smtp_port
            ),
            Err(e) => {
                healthy = false;
                println!("❌ SMTP: {e}");
            },
        },
        Err(_) => println!("⏭️  SMTP: no sender configured, delivery unavailable"),
    }

    let speech = SpeechAdapter::new(config.speech.to_speech_config())?;
    if speech.is_configured() {
        println!("✅ Speech: API key present (voice {})", config.speech.voice_id);
    } else {
        println!("⚠️  Speech: no API key, podcasts will be sent as text");
    }

    let inference = OpenAiInferenceAdapter::new(config.inference.to_inference_config())?;
    if inference.is_configured() {
        println!("✅ Inference: API key present ({})", inference.current_model());
    } else {
        println!("⚠️  Inference: no API key, scripts use the local heuristic");
    }

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILURE)
    })
}

/// List configured profiles
pub fn profiles(config: &AppConfig) -> ExitCode {
    if config.newsletters.is_empty() {
        println!("No newsletter profiles configured");
        return ExitCode::SUCCESS;
    }

    println!("📰 Newsletter profiles:");
    for newsletter in &config.newsletters {
        let state = if newsletter.enabled { "enabled" } else { "disabled" };
        println!("\n  {} ({state})", newsletter.name);
        println!("    From:     {}", newsletter.sender.join(", "));
        println!("    Subject:  {}", newsletter.subject_contains.join(" | "));
        println!("    Max age:  {}h", newsletter.max_age_hours);
        if newsletter.follow_links {
            println!("    Follows linked articles");
        }
        if let Some(voice) = &newsletter.voice_id {
            println!("    Voice:    {voice}");
        }
    }
    ExitCode::SUCCESS
}

/// Build a script from a saved message, no network involved
pub async fn extract(
    config: &AppConfig,
    file: &Path,
    profile: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let profile = match profile {
        Some(name) => config
            .newsletter(name)
            .map(infrastructure::NewsletterConfig::to_profile)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?,
        None => NewsletterProfile::new(
            file.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("newsletter"),
        ),
    };

    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let message = integration_mail::parse_message(MessageUid::new(0), &raw, None, Utc::now())
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let extractor = build_extractor(config)?;
    let content = extractor.extract(&message);
    let script = build_script_builder(config, false)?
        .build(ScriptRequest {
            profile: &profile,
            subject: message.subject(),
            sender: message.sender(),
            date: message.received_at().date_naive(),
            content: &content,
            articles: &[],
        })
        .await;

    println!("📧 Subject:  {}", message.subject());
    println!("   From:     {}", message.sender());
    println!("   Received: {}", message.received_at().to_rfc3339());
    println!(
        "   Content:  {} characters ({:?})",
        content.char_count(),
        content.source()
    );
    if let Some(failure) = content.failure(extractor.min_content_chars()) {
        println!("   ⚠️  {failure}");
    }
    println!(
        "   Script:   {} words, ~{} min, {}",
        script.word_count(),
        script.duration_minutes(),
        origin_label(script.origin())
    );
    println!("\n{}", script.text());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_exit_with_two() {
        let err = anyhow::Error::from(ConfigError::UnknownProfile("x".into()));
        assert_eq!(exit_code_for(&err), EXIT_CONFIG);

        let err = anyhow::Error::from(ApplicationError::Configuration("no sender".into()))
            .context("building pipeline");
        assert_eq!(exit_code_for(&err), EXIT_CONFIG);
    }

    #[test]
    fn other_errors_exit_with_one() {
        let err = anyhow::Error::from(ApplicationError::Transport("refused".into()));
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), EXIT_FAILURE);
    }

    #[test]
    fn origin_labels() {
        assert_eq!(
            origin_label(&ScriptOrigin::Remote {
                model: "gpt-4o-mini".into()
            }),
            "remote: gpt-4o-mini"
        );
        assert_eq!(origin_label(&ScriptOrigin::Local), "local");
    }

    #[tokio::test]
    async fn extract_builds_local_script() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("issue.eml");
        let body = "Bitcoin traded higher overnight as institutional buyers returned to the \
                    market and funding rates stayed calm across the major venues.";
        std::fs::write(
            &file,
            format!(
                "From: Mando Minutes <news@mandominutes.com>\r\n\
                 Subject: Mando Minutes: 7 July\r\n\
                 Date: Mon, 07 Jul 2025 06:30:00 +0000\r\n\
                 Content-Type: text/plain; charset=utf-8\r\n\r\n\
                 {body}\r\n\r\n{body}\r\n"
            ),
        )
        .unwrap();

        let code = extract(&AppConfig::default(), &file, None).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn extract_unknown_profile_is_config_error() {
        let err = extract(&AppConfig::default(), Path::new("missing.eml"), Some("nope"))
            .await
            .unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_CONFIG);
    }

    #[tokio::test]
    async fn extract_missing_file_fails() {
        let err = extract(&AppConfig::default(), Path::new("/nonexistent/issue.eml"), None)
            .await
            .unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }
}
