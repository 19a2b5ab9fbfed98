//! Spoken output
//!
//! [`SpeechOutput`] owns sentence splitting and pacing; the actual
//! synthesis sits behind the [`SpeechEngine`] seam.

mod output;
mod voice;

use async_trait::async_trait;

#[cfg(test)]
pub use output::sentences;
pub use output::SpeechOutput;
pub use voice::SystemVoice;

/// Errors from a synthesis backend
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("failed to start synthesizer {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("synthesizer exited with {0}")]
    Failed(std::process::ExitStatus),
}

/// Renders one sentence to audio, returning when playback is done
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn say(&self, sentence: &str) -> Result<(), SpeechError>;
}
