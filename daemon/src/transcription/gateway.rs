//! Microphone plus transcription backend behind the [`Transcriber`] seam

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::microphone::Microphone;
use super::whisper::WhisperClient;
use super::{CaptureLimits, Transcriber, Transcript, TranscriptionError};

/// Stops the blocking capture when the awaiting future is dropped
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Captures from the default microphone and transcribes remotely
pub struct SpeechGateway {
    microphone: Arc<Microphone>,
    whisper: WhisperClient,
}

impl SpeechGateway {
    pub fn new(microphone: Microphone, whisper: WhisperClient) -> Self {
        Self {
            microphone: Arc::new(microphone),
            whisper,
        }
    }
}

#[async_trait]
impl Transcriber for SpeechGateway {
    async fn capture(&self, limits: CaptureLimits) -> Result<Transcript, TranscriptionError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let _guard = CancelOnDrop(Arc::clone(&cancel));

        let microphone = Arc::clone(&self.microphone);
        let recording = tokio::task::spawn_blocking(move || microphone.record(limits, &cancel))
            .await
            .map_err(|e| TranscriptionError::Microphone(e.to_string()))??;

        let wav = recording
            .to_wav()
            .map_err(|e| TranscriptionError::Microphone(e.to_string()))?;
        let text = self.whisper.transcribe(wav).await?;
        let transcript = Transcript::new(strip_terminal_punctuation(&text));

        if transcript.is_empty() {
            return Err(TranscriptionError::Unintelligible);
        }

        info!(%transcript, "heard");
        Ok(transcript)
    }
}

/// Whisper punctuates sentences; commands are matched as bare phrases
fn strip_terminal_punctuation(text: &str) -> &str {
    text.trim().trim_end_matches(['.', '!', '?'])
}
