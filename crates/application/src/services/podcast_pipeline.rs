//! Podcast pipeline - One newsletter issue from mailbox to listener
//!
//! locate → extract → (follow links) → build script → save → synthesize →
//! save → deliver → (mark seen). Profiles in a run are processed strictly one
//! after another with a fixed delay in between.

use std::{collections::HashMap, fmt, path::PathBuf, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use domain::{
    ExtractionFailure, MailMessage, MessageUid, NewsletterProfile, PodcastScript,
    ReadStatePolicy, ScriptOrigin,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{
        Article, ArtifactStorePort, MailSenderPort, SpeechPort, SynthesisResult,
        VoiceSelection, artifact_file_name,
    },
    services::{
        content_extractor::ContentExtractor,
        delivery_composer::{DeliveryComposer, DeliveryContent},
        email_locator::EmailLocator,
        link_follower::LinkFollower,
        script_builder::{ScriptBuilder, ScriptRequest},
    },
};

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Send the finished podcast; `false` stops after writing artifacts
    pub deliver: bool,
    /// What to do with the source message after delivery
    pub read_state_policy: ReadStatePolicy,
    /// Pause between profiles in one run
    pub inter_item_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deliver: true,
            read_state_policy: ReadStatePolicy::default(),
            inter_item_delay: Duration::from_secs(5),
        }
    }
}

/// Why a profile produced nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No issue within the age window
    NoMatch,
    /// The newest issue was already processed for another profile
    AlreadyHandled {
        /// Message in question
        uid: MessageUid,
        /// Profile that processed it
        by: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "no matching newsletter"),
            Self::AlreadyHandled { uid, by } => {
                write!(f, "message {uid} already handled by profile '{by}'")
            },
        }
    }
}

/// What was produced for one issue
#[derive(Debug, Clone, Serialize)]
pub struct PodcastReport {
    /// Profile name
    pub profile: String,
    /// Source message
    pub uid: MessageUid,
    /// Source subject
    pub subject: String,
    /// Source sender
    pub sender: String,
    /// Script text file
    pub script_path: PathBuf,
    /// Audio file, when synthesis succeeded
    pub audio_path: Option<PathBuf>,
    /// Linked articles as JSON, when any were fetched
    pub articles_path: Option<PathBuf>,
    /// Words in the final script
    pub word_count: usize,
    /// Estimated minutes of audio
    pub duration_minutes: u32,
    /// Strategy that produced the script
    pub script_origin: ScriptOrigin,
    /// Linked articles folded into the script
    pub article_count: usize,
    /// Set when the extracted text was unusable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_failure: Option<String>,
    /// Set when no audio was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_missing: Option<String>,
    /// Source message was flagged `\Seen`
    pub marked_seen: bool,
}

impl PodcastReport {
    /// Whether any stage ran in a degraded mode
    pub fn is_degraded(&self) -> bool {
        self.extraction_failure.is_some()
            || self.audio_missing.is_some()
            || self.script_origin == ScriptOrigin::Fallback
    }
}

/// Result of processing one profile
#[derive(Debug, Clone)]
pub enum ProfileOutcome {
    /// Nothing to do today
    NothingToDo(SkipReason),
    /// Podcast generated and sent
    Delivered(PodcastReport),
    /// Podcast generated, delivery disabled
    Generated(PodcastReport),
}

impl ProfileOutcome {
    /// Report, when something was produced
    pub const fn report(&self) -> Option<&PodcastReport> {
        match self {
            Self::NothingToDo(_) => None,
            Self::Delivered(report) | Self::Generated(report) => Some(report),
        }
    }
}

/// Outcome of one profile within a run
#[derive(Debug, Clone)]
pub struct ProfileRun {
    /// Profile name
    pub profile: String,
    /// What happened
    pub outcome: ProfileOutcome,
}

/// A profile that ended in an error
#[derive(Debug)]
pub struct RunFailure {
    /// Profile being processed
    pub profile: String,
    /// Cause
    pub error: ApplicationError,
}

/// Outcome of a multi-profile run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Profiles processed, in order
    pub completed: Vec<ProfileRun>,
    /// Profiles that failed without ending the run
    pub failed: Vec<RunFailure>,
    /// Failure that aborted the remaining profiles
    pub failure: Option<RunFailure>,
    /// Profiles never attempted because of the failure
    pub skipped: Vec<String>,
}

impl RunSummary {
    /// Whether every profile ran to completion
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.failed.is_empty()
    }

    /// Number of podcasts sent
    pub fn delivered(&self) -> usize {
        self.completed
            .iter()
            .filter(|r| matches!(r.outcome, ProfileOutcome::Delivered(_)))
            .count()
    }
}

/// In-memory products handed from generation to delivery
struct Produced {
    report: PodcastReport,
    script: PodcastScript,
    audio: Option<SynthesisResult>,
}

/// Messages already processed in the current run, by the profile that took them
pub type HandledMessages = HashMap<MessageUid, String>;

/// Drives newsletters through every stage
pub struct PodcastPipeline {
    locator: EmailLocator,
    extractor: ContentExtractor,
    script_builder: ScriptBuilder,
    artifacts: Arc<dyn ArtifactStorePort>,
    link_follower: Option<LinkFollower>,
    speech: Option<Arc<dyn SpeechPort>>,
    delivery: Option<(Arc<dyn MailSenderPort>, DeliveryComposer)>,
    config: PipelineConfig,
}

impl fmt::Debug for PodcastPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodcastPipeline")
            .field("locator", &self.locator)
            .field("script_builder", &self.script_builder)
            .field("has_link_follower", &self.link_follower.is_some())
            .field("has_speech", &self.speech.is_some())
            .field("has_delivery", &self.delivery.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PodcastPipeline {
    /// Create a pipeline without speech, links or delivery
    pub fn new(
        locator: EmailLocator,
        extractor: ContentExtractor,
        script_builder: ScriptBuilder,
        artifacts: Arc<dyn ArtifactStorePort>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            locator,
            extractor,
            script_builder,
            artifacts,
            link_follower: None,
            speech: None,
            delivery: None,
            config,
        }
    }

    /// Follow links for profiles that ask for it
    #[must_use]
    pub fn with_link_follower(mut self, follower: LinkFollower) -> Self {
        self.link_follower = Some(follower);
        self
    }

    /// Synthesize audio
    #[must_use]
    pub fn with_speech(mut self, speech: Arc<dyn SpeechPort>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Send finished podcasts
    #[must_use]
    pub fn with_delivery(
        mut self,
        sender: Arc<dyn MailSenderPort>,
        composer: DeliveryComposer,
    ) -> Self {
        self.delivery = Some((sender, composer));
        self
    }

    /// Pipeline configuration
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process a single profile now
    pub async fn process_profile(
        &self,
        profile: &NewsletterProfile,
    ) -> Result<ProfileOutcome, ApplicationError> {
        self.process_profile_at(profile, Utc::now(), &mut HandledMessages::new())
            .await
    }

    /// Process profiles in order, stopping at the first fatal failure
    pub async fn run(&self, profiles: &[NewsletterProfile]) -> RunSummary {
        let mut handled = HandledMessages::new();
        let mut summary = RunSummary::default();

        for (index, profile) in profiles.iter().enumerate() {
            if index > 0 && !self.config.inter_item_delay.is_zero() {
                debug!(delay_secs = self.config.inter_item_delay.as_secs(), "Pausing between newsletters");
                tokio::time::sleep(self.config.inter_item_delay).await;
            }

            match self.process_profile_at(profile, Utc::now(), &mut handled).await {
                Ok(outcome) => summary.completed.push(ProfileRun {
                    profile: profile.name.clone(),
                    outcome,
                }),
                Err(e) if !e.is_fatal() => {
                    warn!(profile = %profile.name, error = %e, "⚠️ Newsletter failed, continuing");
                    summary.failed.push(RunFailure {
                        profile: profile.name.clone(),
                        error: e,
                    });
                },
                Err(e) => {
                    error!(profile = %profile.name, error = %e, "❌ Run aborted");
                    summary.skipped = profiles[index + 1..]
                        .iter()
                        .map(|p| p.name.clone())
                        .collect();
                    summary.failure = Some(RunFailure {
                        profile: profile.name.clone(),
                        error: e,
                    });
                    break;
                },
            }
        }

        summary
    }

    /// Process one profile with an explicit clock and run-wide dedupe state
    #[instrument(skip(self, profile, handled), fields(profile = %profile.name))]
    pub async fn process_profile_at(
        &self,
        profile: &NewsletterProfile,
        now: DateTime<Utc>,
        handled: &mut HandledMessages,
    ) -> Result<ProfileOutcome, ApplicationError> {
        if self.config.deliver && self.delivery.is_none() {
            return Err(ApplicationError::Configuration(
                "delivery requested but no mail sender is configured".to_string(),
            ));
        }

        let message = match self.locator.locate(profile, now).await {
            Ok(Some(message)) => message,
            Ok(None) => return Ok(ProfileOutcome::NothingToDo(SkipReason::NoMatch)),
            Err(e) => {
                error!(error = %e, "❌ Mailbox lookup failed");
                return Err(e);
            },
        };

        if let Some(by) = handled.get(&message.uid()) {
            info!(uid = %message.uid(), by = %by, "⏭️ Message already handled in this run");
            return Ok(ProfileOutcome::NothingToDo(SkipReason::AlreadyHandled {
                uid: message.uid(),
                by: by.clone(),
            }));
        }
        handled.insert(message.uid(), profile.name.clone());

        let produced = self.produce(profile, &message, now).await?;

        if !self.config.deliver {
            info!(
                script = %produced.report.script_path.display(),
                "📝 Podcast generated, delivery disabled"
            );
            return Ok(ProfileOutcome::Generated(produced.report));
        }

        self.deliver(profile, &message, &produced, now).await?;
        let mut report = produced.report;
        report.marked_seen = self.apply_read_state(message.uid()).await;
        Ok(ProfileOutcome::Delivered(report))
    }

    /// Extract, build and synthesize, writing every artifact
    async fn produce(
        &self,
        profile: &NewsletterProfile,
        message: &MailMessage,
        now: DateTime<Utc>,
    ) -> Result<Produced, ApplicationError> {
        let content = self.extractor.extract(message);
        let extraction_failure = content.failure(self.extractor.min_content_chars());
        if let Some(failure) = &extraction_failure {
            warn!(
                uid = %message.uid(),
                failure = %failure,
                "⚠️ Extraction degraded, continuing with best-effort content"
            );
        }

        let articles = self.follow_links(profile, message).await;

        let script = self
            .script_builder
            .build(ScriptRequest {
                profile,
                subject: message.subject(),
                sender: message.sender(),
                date: now.date_naive(),
                content: &content,
                articles: &articles,
            })
            .await;
        info!(
            words = script.word_count(),
            minutes = script.duration_minutes(),
            origin = ?script.origin(),
            "📝 Script ready"
        );

        let script_path = self
            .artifacts
            .save(
                &artifact_file_name(&profile.name, now, "txt"),
                script.text().as_bytes(),
            )
            .await?;

        let articles_path = self.save_articles(profile, &articles, now).await;

        let (audio, audio_path, audio_missing) = match self.synthesize(profile, script.text()).await {
            Ok(audio) => {
                let path = self
                    .artifacts
                    .save(
                        &artifact_file_name(&profile.name, now, audio.format.extension()),
                        &audio.audio_data,
                    )
                    .await?;
                info!(path = %path.display(), bytes = audio.audio_data.len(), "🔊 Audio saved");
                (Some(audio), Some(path), None)
            },
            Err(reason) => (None, None, Some(reason)),
        };

        let report = PodcastReport {
            profile: profile.name.clone(),
            uid: message.uid(),
            subject: message.subject().to_string(),
            sender: message.sender().to_string(),
            script_path,
            audio_path,
            articles_path,
            word_count: script.word_count(),
            duration_minutes: script.duration_minutes(),
            script_origin: script.origin().clone(),
            article_count: articles.len(),
            extraction_failure: extraction_failure.as_ref().map(ExtractionFailure::to_string),
            audio_missing,
            marked_seen: false,
        };
        Ok(Produced {
            report,
            script,
            audio,
        })
    }

    async fn follow_links(&self, profile: &NewsletterProfile, message: &MailMessage) -> Vec<Article> {
        match &self.link_follower {
            Some(follower) if profile.follow_links => {
                follower
                    .follow(&ContentExtractor::raw_text_parts(message))
                    .await
            },
            _ => Vec::new(),
        }
    }

    async fn save_articles(
        &self,
        profile: &NewsletterProfile,
        articles: &[Article],
        now: DateTime<Utc>,
    ) -> Option<PathBuf> {
        if articles.is_empty() {
            return None;
        }
        let json = match serde_json::to_vec_pretty(articles) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "⚠️ Could not serialize articles");
                return None;
            },
        };
        let name = artifact_file_name(&format!("{}_articles", profile.name), now, "json");
        match self.artifacts.save(&name, &json).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "⚠️ Could not save articles");
                None
            },
        }
    }

    /// Audio bytes, or the reason there are none
    async fn synthesize(
        &self,
        profile: &NewsletterProfile,
        text: &str,
    ) -> Result<SynthesisResult, String> {
        let Some(speech) = self.speech.as_ref().filter(|s| s.is_configured()) else {
            debug!("Speech synthesis not configured");
            return Err("speech synthesis not configured".to_string());
        };

        let voice = VoiceSelection {
            voice_id: profile.style.voice_id.clone(),
            model: profile.style.model.clone(),
        };
        match speech.synthesize(text.to_string(), voice).await {
            Ok(result) => Ok(result),
            Err(e) if e.is_expected() => {
                info!(reason = %e, "Script too long for one synthesis request, sending text only");
                Err(e.to_string())
            },
            Err(e) => {
                warn!(error = %e, "⚠️ Speech synthesis failed, continuing without audio");
                Err(e.to_string())
            },
        }
    }

    async fn deliver(
        &self,
        profile: &NewsletterProfile,
        message: &MailMessage,
        produced: &Produced,
        now: DateTime<Utc>,
    ) -> Result<(), ApplicationError> {
        let Some((sender, composer)) = &self.delivery else {
            return Err(ApplicationError::Configuration(
                "no mail sender is configured".to_string(),
            ));
        };

        let file_name = artifact_file_name(&profile.name, now, "txt");
        let stem = file_name.strip_suffix(".txt").unwrap_or(&file_name);
        let mail = composer.compose(&DeliveryContent {
            profile,
            source: message,
            script: &produced.script,
            audio: produced
                .audio
                .as_ref()
                .map(|a| (a.audio_data.as_slice(), a.format)),
            file_stem: stem,
            article_count: produced.report.article_count,
            generated_at: now,
        });

        let (to, subject) = (mail.to.clone(), mail.subject.clone());
        match sender.send(mail).await {
            Ok(()) => {
                info!(to = %to, subject = %subject, "📧 Podcast delivered");
                Ok(())
            },
            Err(e) => {
                error!(
                    error = %e,
                    script = %produced.report.script_path.display(),
                    "❌ Delivery failed, artifacts kept for manual recovery"
                );
                Err(match e {
                    ApplicationError::Delivery(_) => e,
                    other => ApplicationError::Delivery(other.to_string()),
                })
            },
        }
    }

    async fn apply_read_state(&self, uid: MessageUid) -> bool {
        if !self.config.read_state_policy.marks_seen() {
            return false;
        }
        match self.locator.mark_seen(uid).await {
            Ok(()) => {
                debug!(uid = %uid, "Marked source message as seen");
                true
            },
            Err(e) => {
                warn!(uid = %uid, error = %e, "⚠️ Could not mark source message as seen");
                false
            },
        }
    }
}
