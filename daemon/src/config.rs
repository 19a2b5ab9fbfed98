//! Configuration loading and management
//!
//! Everything is read once at startup from the process environment
//! (optionally seeded from a `.env` file) and stays immutable afterwards.

use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

const DEFAULT_WAKE_PHRASES: &str = "jarvis,hey jarvis,ok jarvis";
const DEFAULT_AI_BASE_URL: &str = "https://models.github.ai/inference";
const DEFAULT_AI_MODEL: &str = "openai/gpt-4.1-mini";
const DEFAULT_AI_MAX_TOKENS: u32 = 150;
const DEFAULT_STT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_STT_MODEL: &str = "whisper-1";
const DEFAULT_MEDIA_PLAYER: &str = "spotify";
const DEFAULT_TTS_RATE: u32 = 173;

/// How the assistant is woken up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationMode {
    /// Continuously transcribe short segments and look for a wake phrase
    WakeWord,
    /// Wait for an explicit user trigger (hotkey chord or Enter)
    Manual,
}

impl FromStr for ActivationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wake" | "wake_word" | "wakeword" => Ok(Self::WakeWord),
            "manual" | "push_to_talk" | "ptt" => Ok(Self::Manual),
            other => Err(ConfigError::InvalidValue {
                var: "JARVIS_ACTIVATION",
                value: other.to_string(),
            }),
        }
    }
}

/// Conversational backend settings
#[derive(Debug)]
pub struct AiConfig {
    pub base_url: String,
    pub token: Option<SecretString>,
    pub model: String,
    pub max_tokens: u32,
}

/// Speech-to-text backend settings
#[derive(Debug)]
pub struct SttConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
}

/// Platform voice settings
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    /// Voice name understood by the platform synthesizer
    pub voice: Option<String>,
    /// Speaking rate in words per minute
    pub rate: u32,
    /// Output volume in `0.0..=1.0`
    pub volume: f32,
}

/// Daemon configuration
#[derive(Debug)]
pub struct Config {
    pub activation: ActivationMode,

    /// Ordered, lowercase wake phrases
    pub wake_phrases: Vec<String>,

    pub ai: AiConfig,

    pub stt: SttConfig,

    pub voice: VoiceConfig,

    /// Media player application path or name
    pub media_player: String,

    /// Directory for runtime data
    pub data_dir: PathBuf,
}

/// Errors raised while reading the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("at least one wake phrase must be configured")]
    NoWakePhrases,

    #[error("HOME is not set")]
    MissingHome,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self, ConfigError> {
        // Ignored if there is no .env file.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let activation = match var("JARVIS_ACTIVATION") {
            Some(value) => value.parse()?,
            None => ActivationMode::WakeWord,
        };

        let wake_phrases = parse_wake_phrases(
            &var("JARVIS_WAKE_WORDS").unwrap_or_else(|| DEFAULT_WAKE_PHRASES.to_string()),
        )?;

        let ai = AiConfig {
            base_url: var("AI_BASE_URL").unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string()),
            token: var("GITHUB_TOKEN").map(SecretString::from),
            model: var("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            max_tokens: parse_or("AI_MAX_TOKENS", var("AI_MAX_TOKENS"), DEFAULT_AI_MAX_TOKENS)?,
        };

        let stt = SttConfig {
            base_url: var("STT_BASE_URL").unwrap_or_else(|| DEFAULT_STT_BASE_URL.to_string()),
            api_key: var("STT_API_KEY")
                .or_else(|| var("OPENAI_API_KEY"))
                .map(SecretString::from),
            model: var("STT_MODEL").unwrap_or_else(|| DEFAULT_STT_MODEL.to_string()),
        };

        let volume = parse_or("JARVIS_TTS_VOLUME", var("JARVIS_TTS_VOLUME"), 1.0_f32)?;
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::InvalidValue {
                var: "JARVIS_TTS_VOLUME",
                value: volume.to_string(),
            });
        }

        let voice = VoiceConfig {
            voice: var("JARVIS_TTS_VOICE"),
            rate: parse_or("JARVIS_TTS_RATE", var("JARVIS_TTS_RATE"), DEFAULT_TTS_RATE)?,
            volume,
        };

        let home = lookup("HOME").ok_or(ConfigError::MissingHome)?;
        let data_dir = PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("jarvis");

        Ok(Self {
            activation,
            wake_phrases,
            ai,
            stt,
            voice,
            media_player: var("SPOTIFY_PATH").unwrap_or_else(|| DEFAULT_MEDIA_PLAYER.to_string()),
            data_dir,
        })
    }

    /// Directory swept for leftover synthesis and capture files
    pub fn artifact_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.artifact_dir())
    }
}

fn parse_wake_phrases(raw: &str) -> Result<Vec<String>, ConfigError> {
    let phrases: Vec<String> = raw
        .split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    if phrases.is_empty() {
        return Err(ConfigError::NoWakePhrases);
    }
    Ok(phrases)
}

fn parse_or<T: FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}
