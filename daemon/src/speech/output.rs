//! Sentence-paced speech

use std::time::Duration;

use tracing::{debug, warn};

use super::SpeechEngine;

/// Pause after each sentence
pub const SENTENCE_PAUSE: Duration = Duration::from_millis(150);

/// Speaks text one sentence at a time
pub struct SpeechOutput {
    engine: Box<dyn SpeechEngine>,
    pause: Duration,
}

impl SpeechOutput {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self::with_pause(engine, SENTENCE_PAUSE)
    }

    pub fn with_pause(engine: Box<dyn SpeechEngine>, pause: Duration) -> Self {
        Self { engine, pause }
    }

    /// Speak `text`, blocking until every sentence has been rendered
    ///
    /// Engine failures are logged and skipped, so this is safe to call
    /// while handling another error.
    pub async fn speak(&self, text: &str) {
        debug!(text, "speaking");

        for sentence in sentences(text) {
            if let Err(e) = self.engine.say(sentence).await {
                warn!(error = %e, sentence, "speech synthesis failed");
            }
            tokio::time::sleep(self.pause).await;
        }
    }
}

/// Split on `.` and drop empty pieces
pub fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split('.').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, FakeSpeech};

    #[test]
    fn test_sentence_splitting() {
        let parts: Vec<&str> = sentences("Going to sleep. Say Jarvis to wake me up.").collect();
        assert_eq!(parts, vec!["Going to sleep", "Say Jarvis to wake me up"]);
        assert_eq!(sentences(" . .. ").count(), 0);
    }

    #[test]
    fn test_speaks_each_sentence_in_order() {
        let log = CallLog::default();
        let output = SpeechOutput::with_pause(Box::new(FakeSpeech::new(&log)), Duration::ZERO);

        tokio_test::block_on(output.speak("Hello there. General Kenobi"));
        assert_eq!(log.spoken(), vec!["Hello there", "General Kenobi"]);
    }

    #[test]
    fn test_engine_failure_is_swallowed() {
        let log = CallLog::default();
        let output = SpeechOutput::with_pause(Box::new(FakeSpeech::failing(&log)), Duration::ZERO);

        tokio_test::block_on(output.speak("First. Second."));
        assert_eq!(log.spoken(), vec!["First", "Second"]);
    }
}
