//! Platform speech synthesizer driven as a child process

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::VoiceConfig;

use super::{SpeechEngine, SpeechError};

/// Target platform for synthesizer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

/// Program and arguments for one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

/// `say` on macOS, SAPI through PowerShell on Windows, `espeak-ng` elsewhere
pub struct SystemVoice {
    config: VoiceConfig,
    platform: Platform,
}

impl SystemVoice {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            platform: Platform::current(),
        }
    }

    /// Build the synthesizer invocation for `sentence`
    pub fn command(&self, sentence: &str) -> VoiceCommand {
        let VoiceConfig { voice, rate, volume } = &self.config;
        let mut args = Vec::new();

        match self.platform {
            Platform::MacOs => {
                if let Some(voice) = voice {
                    args.extend(["-v".to_string(), voice.clone()]);
                }
                args.extend(["-r".to_string(), rate.to_string()]);
                if *volume < 1.0 {
                    args.push(format!("[[volm {volume:.2}]] {sentence}"));
                } else {
                    args.push(sentence.to_string());
                }
                VoiceCommand { program: "say", args }
            }
            Platform::Windows => {
                // SAPI rate runs -10..10 with 0 at roughly 180 wpm
                let sapi_rate = ((i64::from(*rate) - 180) / 20).clamp(-10, 10);
                let sapi_volume = (volume * 100.0).round() as u32;
                let select_voice = voice
                    .as_ref()
                    .map(|v| format!("$s.SelectVoice('{}'); ", v.replace('\'', "''")))
                    .unwrap_or_default();
                let script = format!(
                    "Add-Type -AssemblyName System.Speech; \
                     $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
                     {select_voice}$s.Rate = {sapi_rate}; $s.Volume = {sapi_volume}; \
                     $s.Speak('{}')",
                    sentence.replace('\'', "''")
                );
                args.extend(["-NoProfile".to_string(), "-Command".to_string(), script]);
                VoiceCommand { program: "powershell", args }
            }
            Platform::Other => {
                if let Some(voice) = voice {
                    args.extend(["-v".to_string(), voice.clone()]);
                }
                // espeak-ng amplitude runs 0..200 with 100 as default
                let amplitude = (volume * 100.0).round() as u32;
                args.extend([
                    "-s".to_string(),
                    rate.to_string(),
                    "-a".to_string(),
                    amplitude.to_string(),
                    sentence.to_string(),
                ]);
                VoiceCommand { program: "espeak-ng", args }
            }
        }
    }
}

#[async_trait]
impl SpeechEngine for SystemVoice {
    async fn say(&self, sentence: &str) -> Result<(), SpeechError> {
        run_voice(self.command(sentence)).await
    }
}

/// Run one synthesizer invocation to completion.
///
/// The child is killed if this future is dropped, so an interrupt never
/// leaves a sentence playing after shutdown.
async fn run_voice(command: VoiceCommand) -> Result<(), SpeechError> {
    let VoiceCommand { program, args } = command;

    let status = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SpeechError::Spawn { program, source })?
        .wait()
        .await
        .map_err(|source| SpeechError::Spawn { program, source })?;

    if status.success() {
        Ok(())
    } else {
        Err(SpeechError::Failed(status))
    }
}
