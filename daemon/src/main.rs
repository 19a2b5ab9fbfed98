//! jarvis: voice-activated command dispatcher
//!
//! Listens for a wake phrase (or a manual trigger), captures one spoken
//! command and executes it:
//! - media transport control and web shortcuts
//! - playing a named track from YouTube
//! - free-form questions answered by a chat completion backend
//!
//! Runs a single cooperative loop on a current-thread runtime; blocking
//! audio work is moved to the blocking pool and awaited in sequence.

mod actions;
mod activation;
mod ai;
mod audio;
mod config;
mod dispatch;
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
mod hotkey;
mod lifecycle;
mod speech;
mod state;
#[cfg(test)]
mod testing;
mod transcription;

use std::sync::Arc;

use anyhow::{Context, Result};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::actions::{ActionExecutor, Desktop, SystemDesktop, YouTubeSearch};
use crate::activation::{
    spawn_terminal_reader, Activation, ActivationController, ChannelTrigger, Services,
    ShutdownReason, TriggerSource, WakePhrases,
};
use crate::ai::{AiResponder, ChatClient};
use crate::audio::{AudioFeedback, CpalTonePlayer};
use crate::config::{ActivationMode, Config, SttConfig};
use crate::dispatch::CommandDispatcher;
use crate::lifecycle::{ArtifactStore, ShutdownSignal};
use crate::speech::{SpeechOutput, SystemVoice};
use crate::transcription::{Microphone, SpeechGateway, WhisperClient};

/// Pending manual triggers; extra presses are dropped
const TRIGGER_BUFFER: usize = 4;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "jarvis starting");

    let config = Config::load().context("failed to load configuration")?;
    config
        .ensure_dirs()
        .with_context(|| format!("failed to create {}", config.artifact_dir().display()))?;
    info!(
        activation = ?config.activation,
        wake_phrases = ?config.wake_phrases,
        data_dir = %config.data_dir.display(),
        "configuration loaded"
    );

    let artifacts = ArtifactStore::new(config.artifact_dir());
    let Config {
        activation: mode,
        wake_phrases,
        ai,
        stt,
        voice,
        media_player,
        ..
    } = config;

    let speech = Arc::new(SpeechOutput::new(Box::new(SystemVoice::new(voice))));
    let desktop: Arc<dyn Desktop> = Arc::new(SystemDesktop::new());
    let transcriber = build_transcriber(stt)?;
    let responder = AiResponder::new(Box::new(
        ChatClient::new(ai).context("failed to build AI client")?,
    ));
    let actions = ActionExecutor::new(
        Arc::clone(&desktop),
        Box::new(YouTubeSearch::new()?),
        Arc::clone(&speech),
        media_player,
    );

    // Manual triggers: the hotkey chord (macOS) and Enter on the terminal
    let (trigger_tx, trigger_rx) = mpsc::channel::<TriggerSource>(TRIGGER_BUFFER);
    #[cfg(target_os = "macos")]
    let hotkey = if mode == ActivationMode::Manual {
        start_hotkey(trigger_tx.clone())
    } else {
        None
    };

    let activation = match mode {
        ActivationMode::WakeWord => {
            drop(trigger_tx);
            Activation::WakeWord(WakePhrases::new(&wake_phrases))
        }
        ActivationMode::Manual => {
            spawn_terminal_reader(trigger_tx).context("failed to start terminal trigger")?;
            info!("press Enter to talk");
            Activation::Manual(Box::new(ChannelTrigger::new(trigger_rx)))
        }
    };

    let dispatcher = CommandDispatcher::new(
        Arc::clone(&speech),
        actions,
        responder,
        activation.sleep_notice(),
    );
    let services = Services {
        transcriber: Box::new(transcriber),
        speech,
        feedback: AudioFeedback::new(Box::new(CpalTonePlayer::new()), desktop),
        dispatcher,
        artifacts,
    };
    let mut controller = ActivationController::new(activation, services);

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    info!("daemon initialized, entering main loop");

    let reason = tokio::select! {
        outcome = async {
            controller.start().await;
            controller.run().await
        } => {
            info!(?outcome, "controller exited");
            ShutdownReason::from(outcome)
        }

        _ = shutdown.wait() => {
            info!("shutdown signal received");
            ShutdownReason::Interrupted
        }
    };

    controller.shutdown(reason).await;

    #[cfg(target_os = "macos")]
    if let Some(listener) = hotkey {
        listener.stop();
    }

    info!("jarvis stopped");

    Ok(())
}

fn build_transcriber(stt: SttConfig) -> Result<SpeechGateway> {
    let api_key: SecretString = stt
        .api_key
        .context("STT_API_KEY or OPENAI_API_KEY must be set for speech recognition")?;
    let whisper = WhisperClient::new(&stt.base_url, api_key, stt.model)
        .context("failed to build transcription client")?;
    Ok(SpeechGateway::new(Microphone::new(), whisper))
}

#[cfg(target_os = "macos")]
fn start_hotkey(tx: mpsc::Sender<TriggerSource>) -> Option<hotkey::HotkeyListener> {
    let listener = hotkey::HotkeyListener::new(tx);
    match listener.start() {
        Ok(()) => {
            info!("hotkey listener started, press Control+Option to talk");
            Some(listener)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to start hotkey listener");
            tracing::warn!("continuing without hotkey support - check Accessibility permissions");
            None
        }
    }
}
