//! Types for speech synthesis output

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Audio formats the synthesis service can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format
    #[default]
    Mp3,
    /// WAV format (uncompressed)
    Wav,
    /// Opus codec
    Opus,
}

impl AudioFormat {
    /// Get the MIME type for this audio format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Opus => "audio/opus",
        }
    }

    /// Get the file extension for this audio format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Opus => "opus",
        }
    }

    /// Value of the `output_format` query parameter
    #[must_use]
    pub const fn api_output_format(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3_44100_128",
            Self::Wav => "wav_44100",
            Self::Opus => "opus_48000_128",
        }
    }

    /// Parse audio format from a `Content-Type` header value
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let base_mime = mime.split(';').next().unwrap_or(mime).trim();

        match base_mime {
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/opus" | "audio/ogg" => Some(Self::Opus),
            _ => None,
        }
    }
}

/// Synthesized audio with its format
#[derive(Debug, Clone)]
pub struct AudioData {
    data: Bytes,
    format: AudioFormat,
}

impl AudioData {
    /// Create new audio data
    #[must_use]
    pub fn new(data: impl Into<Bytes>, format: AudioFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw audio bytes
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data.to_vec()
    }

    /// Get the audio format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Size of the audio data in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the audio data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_round_trip_for_compound_header() {
        assert_eq!(
            AudioFormat::from_mime_type("audio/mpeg; charset=binary"),
            Some(AudioFormat::Mp3)
        );
        assert_eq!(AudioFormat::from_mime_type("application/json"), None);
    }

    #[test]
    fn api_output_format_names() {
        assert_eq!(AudioFormat::Mp3.api_output_format(), "mp3_44100_128");
        assert_eq!(AudioFormat::Opus.extension(), "opus");
    }

    #[test]
    fn audio_data_accessors() {
        let audio = AudioData::new(vec![0xFF, 0xFB, 0x90], AudioFormat::Mp3);
        assert_eq!(audio.len(), 3);
        assert!(!audio.is_empty());
        assert_eq!(audio.format(), AudioFormat::Mp3);
        assert_eq!(audio.into_data(), vec![0xFF, 0xFB, 0x90]);
    }
}
