//! Application services - Use case implementations

mod content_extractor;
mod delivery_composer;
mod elaboration;
mod email_locator;
mod link_follower;
mod podcast_pipeline;
mod script_builder;

pub use content_extractor::{
    ContentExtractor, DEFAULT_BOILERPLATE_PATTERNS, ExtractorConfig, decode_bytes, decode_part,
    normalize_whitespace, strip_html,
};
pub use delivery_composer::{
    DEFAULT_BODY_TEMPLATE, DEFAULT_SUBJECT_TEMPLATE, DeliveryComposer, DeliveryConfig,
    DeliveryContent,
};
pub use elaboration::{ElaborationRule, ElaborationTable};
pub use email_locator::{EmailLocator, LocatorConfig};
pub use link_follower::{LinkFollower, LinkFollowerConfig};
pub use podcast_pipeline::{
    HandledMessages, PipelineConfig, PodcastPipeline, PodcastReport, ProfileOutcome, ProfileRun,
    RunFailure, RunSummary, SkipReason,
};
pub use script_builder::{
    DEFAULT_SYSTEM_PROMPT, ScriptBuilder, ScriptBuilderConfig, ScriptRequest, ScriptStrategy,
};
