//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod article_port;
mod artifact_store_port;
mod inference_port;
mod mail_sender_port;
mod mailbox_port;
mod speech_port;

#[cfg(test)]
pub use article_port::MockArticleFetcherPort;
pub use article_port::{Article, ArticleFetcherPort};
#[cfg(test)]
pub use artifact_store_port::MockArtifactStorePort;
pub use artifact_store_port::{ARTIFACT_TIMESTAMP_FORMAT, ArtifactStorePort, artifact_file_name};
#[cfg(test)]
pub use inference_port::MockInferencePort;
pub use inference_port::{InferencePort, InferenceResult};
#[cfg(test)]
pub use mail_sender_port::MockMailSenderPort;
pub use mail_sender_port::{Attachment, MailSenderPort, OutgoingMail};
#[cfg(test)]
pub use mailbox_port::{MockMailboxPort, MockMailboxSession};
pub use mailbox_port::{MailboxPort, MailboxSession, SearchQuery};
#[cfg(test)]
pub use speech_port::MockSpeechPort;
pub use speech_port::{SpeechPort, SynthesisResult, VoiceSelection};
