//! Speech-to-text gateway
//!
//! Captures one utterance from the microphone and turns it into a
//! lowercase [`Transcript`]. Expected failures come back as
//! [`TranscriptionError`] kinds for the controller to act on.

mod gateway;
mod microphone;
mod segmenter;
mod whisper;

use std::time::Duration;

use async_trait::async_trait;

pub use gateway::SpeechGateway;
pub use microphone::Microphone;
pub use whisper::WhisperClient;

/// A single recognized utterance, lowercase and trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript(String);

impl Transcript {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounds for one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    /// How long to wait for speech to start; `None` waits forever
    pub start_timeout: Option<Duration>,
    /// Maximum length of the captured phrase
    pub phrase_limit: Duration,
}

impl CaptureLimits {
    /// Short segments checked for a wake phrase
    pub const WAKE_SEGMENT: Self = Self {
        start_timeout: None,
        phrase_limit: Duration::from_secs(3),
    };

    /// One spoken command after activation
    pub const COMMAND: Self = Self {
        start_timeout: Some(Duration::from_secs(5)),
        phrase_limit: Duration::from_secs(6),
    };
}

/// Expected failure modes of a capture
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptionError {
    #[error("no speech detected before the timeout")]
    NoSpeechDetected,

    #[error("audio could not be understood")]
    Unintelligible,

    #[error("transcription service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("microphone error: {0}")]
    Microphone(String),
}

/// Source of transcripts
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Capture one utterance and transcribe it
    async fn capture(&self, limits: CaptureLimits) -> Result<Transcript, TranscriptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_normalizes() {
        let transcript = Transcript::new("  Open Google  ");
        assert_eq!(transcript.as_str(), "open google");
        assert_eq!(transcript.len(), 11);
        assert!(Transcript::new("   ").is_empty());
    }

    #[test]
    fn test_length_counts_characters() {
        assert_eq!(Transcript::new("é").len(), 1);
    }

    #[test]
    fn test_limits() {
        assert!(CaptureLimits::WAKE_SEGMENT.start_timeout.is_none());
        assert_eq!(CaptureLimits::COMMAND.start_timeout, Some(Duration::from_secs(5)));
        assert_eq!(CaptureLimits::COMMAND.phrase_limit, Duration::from_secs(6));
    }
}
