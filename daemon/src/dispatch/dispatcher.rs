//! Executes a classified intent and reports how the loop should proceed

use std::sync::Arc;

use tracing::{debug, info};

use crate::actions::{ActionError, ActionExecutor, SystemKey};
use crate::ai::AiResponder;
use crate::speech::SpeechOutput;
use crate::transcription::Transcript;

use super::intent::{classify, Intent};

const GOOGLE_URL: &str = "https://www.google.com";
const YOUTUBE_URL: &str = "https://www.youtube.com";

/// Spoken when "play" is said without a track name
pub const MISSING_TRACK_PROMPT: &str = "Please tell the song name";

/// How the activation loop proceeds after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Continue,
    Sleep,
    Terminate,
}

pub struct CommandDispatcher {
    speech: Arc<SpeechOutput>,
    actions: ActionExecutor,
    ai: AiResponder,
    /// Spoken on the way into sleep; depends on the activation mode
    sleep_notice: String,
}

impl CommandDispatcher {
    pub fn new(
        speech: Arc<SpeechOutput>,
        actions: ActionExecutor,
        ai: AiResponder,
        sleep_notice: impl Into<String>,
    ) -> Self {
        Self {
            speech,
            actions,
            ai,
            sleep_notice: sleep_notice.into(),
        }
    }

    /// Classify `transcript` and carry out the single matching intent
    pub async fn dispatch(&self, transcript: &Transcript) -> Result<ControlSignal, ActionError> {
        let intent = classify(transcript);
        info!(command = %transcript, ?intent, "dispatching command");
        self.execute(intent).await
    }

    pub async fn execute(&self, intent: Intent) -> Result<ControlSignal, ActionError> {
        match intent {
            Intent::OpenGoogle => {
                self.speech.speak("Opening Google").await;
                self.actions.open_url(GOOGLE_URL)?;
            }
            Intent::OpenYouTube => {
                self.speech.speak("Opening YouTube").await;
                self.actions.open_url(YOUTUBE_URL)?;
            }
            Intent::OpenSpotify => {
                self.speech.speak("Opening Spotify").await;
                self.actions.open_media_player().await?;
            }
            Intent::NextTrack => {
                self.speech.speak("Next song").await;
                self.actions.media_key(SystemKey::NextTrack)?;
            }
            Intent::PreviousTrack => {
                self.speech.speak("Previous song").await;
                self.actions.media_key(SystemKey::PreviousTrack)?;
            }
            Intent::PauseMusic => {
                self.speech.speak("Pausing").await;
                self.actions.media_key(SystemKey::PlayPause)?;
            }
            Intent::ResumeMusic => {
                self.speech.speak("Resuming").await;
                self.actions.media_key(SystemKey::PlayPause)?;
            }
            Intent::PlayNamedTrack { name } if name.is_empty() => {
                self.speech.speak(MISSING_TRACK_PROMPT).await;
            }
            Intent::PlayNamedTrack { name } => {
                self.actions.play_named_track(&name).await?;
            }
            Intent::Sleep => {
                self.speech.speak(&self.sleep_notice).await;
                return Ok(ControlSignal::Sleep);
            }
            Intent::Terminate => {
                self.speech.speak("Goodbye").await;
                return Ok(ControlSignal::Terminate);
            }
            Intent::Fallback { query } => {
                debug!(%query, "no phrase matched, asking AI");
                let reply = self.ai.respond(&query).await;
                self.speech.speak(&reply).await;
            }
        }

        Ok(ControlSignal::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ai::DEGRADED_REPLY;
    use crate::speech::sentences;
    use crate::testing::{CallLog, FakeChat, FakeDesktop, FakeSearch, FakeSpeech};

    const SLEEP_NOTICE: &str = "Going to sleep. Say Jarvis to wake me up.";

    fn dispatcher(log: &CallLog, chat: FakeChat) -> CommandDispatcher {
        let speech = Arc::new(SpeechOutput::with_pause(
            Box::new(FakeSpeech::new(log)),
            Duration::ZERO,
        ));
        let actions = ActionExecutor::new(
            Arc::new(FakeDesktop::new(log)),
            Box::new(FakeSearch::found(log, "https://www.youtube.com/watch?v=abc")),
            Arc::clone(&speech),
            "Spotify".to_string(),
        )
        .with_launch_settle(Duration::ZERO);

        CommandDispatcher::new(speech, actions, AiResponder::new(Box::new(chat)), SLEEP_NOTICE)
    }

    async fn run(log: &CallLog, command: &str) -> ControlSignal {
        let dispatcher = dispatcher(log, FakeChat::replying(log, "It is sunny."));
        dispatcher.dispatch(&Transcript::new(command)).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_google() {
        let log = CallLog::default();
        assert_eq!(run(&log, "open google").await, ControlSignal::Continue);
        assert_eq!(
            log.entries(),
            vec!["speak:Opening Google", "open:https://www.google.com"]
        );
    }

    #[tokio::test]
    async fn test_open_spotify_launches_player() {
        let log = CallLog::default();
        assert_eq!(run(&log, "open spotify please").await, ControlSignal::Continue);
        assert_eq!(log.entries(), vec!["speak:Opening Spotify", "launch:Spotify"]);
    }

    #[tokio::test]
    async fn test_transport_keys() {
        for (command, spoken, key) in [
            ("next song", "Next song", "key:NextTrack"),
            ("go back to the previous song", "Previous song", "key:PreviousTrack"),
            ("pause the music", "Pausing", "key:PlayPause"),
            ("resume", "Resuming", "key:PlayPause"),
        ] {
            let log = CallLog::default();
            assert_eq!(run(&log, command).await, ControlSignal::Continue);
            assert_eq!(log.spoken(), vec![spoken], "{command}");
            assert_eq!(log.count(key), 1, "{command}");
        }
    }

    #[tokio::test]
    async fn test_play_without_name_prompts() {
        let log = CallLog::default();
        assert_eq!(run(&log, "play").await, ControlSignal::Continue);
        assert_eq!(log.entries(), vec![format!("speak:{MISSING_TRACK_PROMPT}")]);
    }

    #[tokio::test]
    async fn test_play_named_track() {
        let log = CallLog::default();
        assert_eq!(run(&log, "play bohemian rhapsody").await, ControlSignal::Continue);
        assert_eq!(
            log.entries(),
            vec![
                "speak:Playing bohemian rhapsody on YouTube",
                "search:bohemian rhapsody",
                "open:https://www.youtube.com/watch?v=abc",
            ]
        );
    }

    #[tokio::test]
    async fn test_termination_phrases() {
        for command in ["exit", "shutdown now", "ok goodbye"] {
            let log = CallLog::default();
            assert_eq!(run(&log, command).await, ControlSignal::Terminate, "{command}");
            assert_eq!(log.spoken(), vec!["Goodbye"]);
        }
    }

    #[tokio::test]
    async fn test_sleep_phrases() {
        for command in ["go to sleep", "stop listening", "please stop listening now"] {
            let log = CallLog::default();
            assert_eq!(run(&log, command).await, ControlSignal::Sleep, "{command}");
            assert_eq!(log.spoken(), vec!["Going to sleep", "Say Jarvis to wake me up"]);
        }
    }

    #[tokio::test]
    async fn test_fallback_speaks_ai_reply() {
        let log = CallLog::default();
        assert_eq!(run(&log, "what is the weather").await, ControlSignal::Continue);
        assert_eq!(
            log.entries(),
            vec!["ai:what is the weather", "speak:It is sunny"]
        );
    }

    #[tokio::test]
    async fn test_fallback_degrades_when_ai_fails() {
        let log = CallLog::default();
        let dispatcher = dispatcher(&log, FakeChat::failing(&log));
        let signal = dispatcher
            .dispatch(&Transcript::new("tell me a joke"))
            .await
            .unwrap();

        assert_eq!(signal, ControlSignal::Continue);
        let expected: Vec<&str> = sentences(DEGRADED_REPLY).collect();
        assert_eq!(log.spoken(), expected);
    }

    #[tokio::test]
    async fn test_action_failure_is_returned() {
        let log = CallLog::default();
        let speech = Arc::new(SpeechOutput::with_pause(
            Box::new(FakeSpeech::new(&log)),
            Duration::ZERO,
        ));
        let actions = ActionExecutor::new(
            Arc::new(FakeDesktop::failing(&log)),
            Box::new(FakeSearch::empty(&log)),
            Arc::clone(&speech),
            "Spotify".to_string(),
        );
        let dispatcher = CommandDispatcher::new(
            speech,
            actions,
            AiResponder::new(Box::new(FakeChat::failing(&log))),
            SLEEP_NOTICE,
        );

        let err = dispatcher
            .dispatch(&Transcript::new("open youtube"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Browser { .. }));
    }
}
