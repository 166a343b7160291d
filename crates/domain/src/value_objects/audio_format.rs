//! Audio container formats produced by speech synthesis

use std::fmt;

use serde::{Deserialize, Serialize};

/// Audio container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG layer 3
    #[default]
    Mp3,
    /// Uncompressed PCM in a WAV container
    Wav,
    /// Opus codec
    Opus,
}

impl AudioFormat {
    /// MIME type for attachments
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Opus => "audio/opus",
        }
    }

    /// File extension without the dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Opus => "opus",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
