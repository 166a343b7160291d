//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod article_fetcher_adapter;
mod filesystem_artifact_store;
mod imap_mailbox_adapter;
mod openai_inference_adapter;
mod smtp_mail_sender_adapter;
mod speech_adapter;

pub use article_fetcher_adapter::ArticleFetcherAdapter;
pub use filesystem_artifact_store::FilesystemArtifactStore;
pub use imap_mailbox_adapter::ImapMailboxAdapter;
pub use openai_inference_adapter::OpenAiInferenceAdapter;
pub use smtp_mail_sender_adapter::SmtpMailSenderAdapter;
pub use speech_adapter::SpeechAdapter;
