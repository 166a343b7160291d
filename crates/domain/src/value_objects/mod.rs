//! Value Objects - Immutable, identity-less domain primitives

mod audio_format;
mod email_address;
mod message_uid;
mod read_state_policy;

pub use audio_format::AudioFormat;
pub use email_address::EmailAddress;
pub use message_uid::MessageUid;
pub use read_state_policy::ReadStatePolicy;
