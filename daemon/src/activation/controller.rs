//! Activation controller
//!
//! Runs the wait -> capture -> dispatch loop. Every iteration is guarded:
//! a failure is logged, the session drops back to waiting and the loop
//! resumes after a short backoff. Only TERMINATE or a closed trigger
//! source ends [`ActivationController::run`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::actions::ActionError;
use crate::audio::{AudioFeedback, VolumeDirection, DUCK_STEPS};
use crate::dispatch::{CommandDispatcher, ControlSignal};
use crate::lifecycle::ArtifactStore;
use crate::speech::SpeechOutput;
use crate::state::{Session, SessionState, TransitionError};
use crate::transcription::{CaptureLimits, Transcriber, Transcript, TranscriptionError};

use super::{Activation, WakePhrases};

/// Transcripts shorter than this are treated as noise
const MIN_COMMAND_CHARS: usize = 2;

const NETWORK_ERROR_NOTICE: &str = "Network error";
const SHUTDOWN_NOTICE: &str = "Shutting down";

/// Collaborators the controller drives
pub struct Services {
    pub transcriber: Box<dyn Transcriber>,
    pub speech: Arc<SpeechOutput>,
    pub feedback: AudioFeedback,
    pub dispatcher: CommandDispatcher,
    pub artifacts: ArtifactStore,
}

/// Timing knobs of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Pause after a failed iteration
    pub error_backoff: Duration,
    /// Pause after the transcription service failed during wake listening
    pub service_retry: Duration,
    /// Pause after the microphone failed during wake listening
    pub microphone_retry: Duration,
    /// Volume key presses while capturing a command
    pub duck_steps: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            error_backoff: Duration::from_secs(1),
            service_retry: Duration::from_secs(1),
            microphone_retry: Duration::from_millis(500),
            duck_steps: DUCK_STEPS,
        }
    }
}

/// Why [`ActivationController::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A terminate command was dispatched
    Terminated,
    /// The manual trigger source went away
    TriggerClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Terminated,
    TriggerClosed,
    /// SIGINT or SIGTERM
    Interrupted,
}

impl From<RunOutcome> for ShutdownReason {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Terminated => ShutdownReason::Terminated,
            RunOutcome::TriggerClosed => ShutdownReason::TriggerClosed,
        }
    }
}

/// Failure of one loop iteration
#[derive(Debug, thiserror::Error)]
enum IterationError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

pub struct ActivationController {
    session: Session,
    activation: Activation,
    services: Services,
    settings: ControllerSettings,
    /// Output volume is currently lowered by `duck_steps`
    ducked: bool,
}

impl ActivationController {
    pub fn new(activation: Activation, services: Services) -> Self {
        Self {
            session: Session::new(),
            activation,
            services,
            settings: ControllerSettings::default(),
            ducked: false,
        }
    }

    #[cfg(test)]
    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Clear leftovers of a previous run and announce readiness
    pub async fn start(&self) {
        let removed = self.services.artifacts.sweep();
        info!(removed, activation = ?self.activation, "controller ready");
        self.services.speech.speak(&self.activation.banner()).await;
    }

    /// Run until terminated or the trigger source closes
    pub async fn run(&mut self) -> RunOutcome {
        loop {
            if self.session.state() == SessionState::Terminated {
                return RunOutcome::Terminated;
            }

            let result = self.iterate().await;
            if let Activation::Manual(trigger) = &mut self.activation {
                trigger.discard_pending();
            }

            match result {
                Ok(Some(outcome)) => return outcome,
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, state = %self.session.state(), "command iteration failed");
                    self.recover();
                    tokio::time::sleep(self.settings.error_backoff).await;
                }
            }
        }
    }

    /// Release resources exactly once; consumes the controller
    pub async fn shutdown(mut self, reason: ShutdownReason) {
        info!(?reason, state = %self.session.state(), "shutting down");

        self.restore_volume();
        if self.session.state() != SessionState::Terminated {
            if let Err(e) = self.session.transition_to(SessionState::Terminated) {
                warn!(error = %e, "could not mark session terminated");
            }
        }

        // TERMINATE has already said goodbye
        if reason != ShutdownReason::Terminated {
            self.services.speech.speak(SHUTDOWN_NOTICE).await;
        }

        let removed = self.services.artifacts.sweep();
        info!(removed, "shutdown complete");
    }

    async fn iterate(&mut self) -> Result<Option<RunOutcome>, IterationError> {
        debug_assert!(self.session.state().is_waiting());

        let activated = match &mut self.activation {
            Activation::Manual(trigger) => trigger.wait().await,
            Activation::WakeWord(phrases) => {
                wait_for_wake_phrase(&*self.services.transcriber, phrases, &self.settings).await;
                Ok(())
            }
        };
        if activated.is_err() {
            info!("trigger source closed");
            return Ok(Some(RunOutcome::TriggerClosed));
        }

        self.session.transition_to(SessionState::AwaitingCommand)?;
        let from_sleep = self.session.previous() == Some(SessionState::Sleeping);

        let transcript = match self.capture_command(from_sleep).await {
            Some(t) if t.len() >= MIN_COMMAND_CHARS => t,
            other => {
                debug!(heard = ?other.as_ref().map(Transcript::as_str), "no usable command");
                self.session.transition_to(SessionState::AwaitingActivation)?;
                return Ok(None);
            }
        };

        info!(command = %transcript, "command heard");
        match self.services.dispatcher.dispatch(&transcript).await? {
            ControlSignal::Continue => {
                self.session.transition_to(SessionState::AwaitingActivation)?;
                Ok(None)
            }
            ControlSignal::Sleep => {
                self.session.transition_to(SessionState::Sleeping)?;
                Ok(None)
            }
            ControlSignal::Terminate => {
                self.session.transition_to(SessionState::Terminated)?;
                Ok(Some(RunOutcome::Terminated))
            }
        }
    }

    /// Cue, duck, listen for one command and restore volume
    async fn capture_command(&mut self, from_sleep: bool) -> Option<Transcript> {
        if from_sleep {
            debug!("woken from sleep, skipping cue");
        } else {
            self.services.feedback.cue().await;
            match self
                .services
                .feedback
                .adjust_volume(VolumeDirection::Down, self.settings.duck_steps)
            {
                Ok(()) => self.ducked = true,
                Err(e) => warn!(error = %e, "could not lower volume"),
            }
        }

        let result = self.services.transcriber.capture(CaptureLimits::COMMAND).await;
        self.restore_volume();

        match result {
            Ok(transcript) => Some(transcript),
            Err(TranscriptionError::ServiceUnavailable(reason)) => {
                warn!(%reason, "transcription service unavailable");
                self.services.speech.speak(NETWORK_ERROR_NOTICE).await;
                None
            }
            Err(e) => {
                debug!(error = %e, "no command captured");
                None
            }
        }
    }

    fn restore_volume(&mut self) {
        if !self.ducked {
            return;
        }
        self.ducked = false;
        if let Err(e) = self
            .services
            .feedback
            .adjust_volume(VolumeDirection::Up, self.settings.duck_steps)
        {
            warn!(error = %e, "could not restore volume");
        }
    }

    /// Return to waiting after a failed iteration
    fn recover(&mut self) {
        self.restore_volume();
        if self.session.state() == SessionState::AwaitingCommand {
            if let Err(e) = self.session.transition_to(SessionState::AwaitingActivation) {
                warn!(error = %e, "could not return to waiting");
            }
        }
    }
}

/// Listen in short segments until one contains a wake phrase
async fn wait_for_wake_phrase(
    transcriber: &dyn Transcriber,
    phrases: &WakePhrases,
    settings: &ControllerSettings,
) {
    loop {
        match transcriber.capture(CaptureLimits::WAKE_SEGMENT).await {
            Ok(heard) => match phrases.detect(&heard) {
                Some(phrase) => {
                    info!(phrase, "wake phrase detected");
                    return;
                }
                None => debug!(%heard, "not a wake phrase"),
            },
            Err(TranscriptionError::NoSpeechDetected | TranscriptionError::Unintelligible) => {}
            Err(TranscriptionError::ServiceUnavailable(reason)) => {
                warn!(%reason, "transcription service unavailable while listening for wake phrase");
                tokio::time::sleep(settings.service_retry).await;
            }
            Err(TranscriptionError::Microphone(reason)) => {
                warn!(%reason, "microphone error while listening for wake phrase");
                tokio::time::sleep(settings.microphone_retry).await;
            }
        }
    }
}
