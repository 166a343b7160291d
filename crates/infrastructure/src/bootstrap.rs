//! Wiring from configuration to a ready pipeline

use std::sync::Arc;

use application::{
    ContentExtractor, DeliveryComposer, ElaborationTable, EmailLocator, LinkFollower,
    PodcastPipeline, ScriptBuilder, error::ApplicationError,
};
use tracing::{debug, info};

use crate::{
    adapters::{
        ArticleFetcherAdapter, FilesystemArtifactStore, ImapMailboxAdapter,
        OpenAiInferenceAdapter, SmtpMailSenderAdapter, SpeechAdapter,
    },
    config::AppConfig,
};

/// Content extractor with the configured boilerplate patterns
pub fn build_extractor(config: &AppConfig) -> Result<ContentExtractor, ApplicationError> {
    ContentExtractor::new(&config.pipeline.to_extractor_config())
}

/// Script builder with elaborations, and remote generation when `remote` is set
pub fn build_script_builder(
    config: &AppConfig,
    remote: bool,
) -> Result<ScriptBuilder, ApplicationError> {
    let elaborations = ElaborationTable::new(&config.pipeline.elaborations)?;
    let builder = ScriptBuilder::new(
        config
            .pipeline
            .to_script_config(&config.inference.system_prompt),
    )
    .with_elaborations(elaborations);

    if !remote {
        return Ok(builder);
    }
    let inference = OpenAiInferenceAdapter::new(config.inference.to_inference_config())?;
    Ok(builder.with_inference(Arc::new(inference)))
}

/// SMTP sender for delivery and connectivity checks
pub fn build_mail_sender(config: &AppConfig) -> Result<SmtpMailSenderAdapter, ApplicationError> {
    config
        .delivery
        .to_smtp_config(&config.mailbox)
        .map(SmtpMailSenderAdapter::new)
        .ok_or_else(|| {
            ApplicationError::Configuration("delivery.sender_email is not set".to_string())
        })
}

/// Assemble the full pipeline
///
/// With `deliver` unset no SMTP sender is created and runs stop after the
/// artifacts are written.
pub fn build_pipeline(config: &AppConfig, deliver: bool) -> Result<PodcastPipeline, ApplicationError> {
    let mailbox = Arc::new(ImapMailboxAdapter::new(config.mailbox.to_imap_config()));
    let locator = EmailLocator::new(
        mailbox,
        config.pipeline.to_locator_config(&config.mailbox.folder),
    );
    let artifacts = Arc::new(FilesystemArtifactStore::new(
        config.output.podcast_dir.clone(),
    ));

    let fetcher = ArticleFetcherAdapter::new(config.articles.to_article_config())?;
    let follower = LinkFollower::new(Arc::new(fetcher), config.articles.to_follower_config());
    let speech = SpeechAdapter::new(config.speech.to_speech_config())?;

    let mut pipeline = PodcastPipeline::new(
        locator,
        build_extractor(config)?,
        build_script_builder(config, true)?,
        artifacts,
        config.pipeline.to_pipeline_config(deliver),
    )
    .with_link_follower(follower)
    .with_speech(Arc::new(speech));

    if deliver {
        let sender = build_mail_sender(config)?;
        let composer = config
            .delivery
            .to_delivery_config()
            .map(DeliveryComposer::new)
            .ok_or_else(|| {
                ApplicationError::Configuration("delivery.recipient_email is not set".to_string())
            })?;
        pipeline = pipeline.with_delivery(Arc::new(sender), composer);
        debug!("Delivery enabled");
    }

    info!(
        podcast_dir = %config.output.podcast_dir.display(),
        deliver,
        "🔧 Pipeline assembled"
    );
    Ok(pipeline)
}
