//! Audio feedback: activation cue and output volume ducking

mod feedback;
mod player;

use async_trait::async_trait;

pub use feedback::{AudioFeedback, VolumeDirection, DUCK_STEPS};
pub use player::CpalTonePlayer;

/// Errors from tone playback
#[derive(Debug, thiserror::Error)]
pub enum ToneError {
    #[error("no output device available")]
    NoDevice,

    #[error("output stream error: {0}")]
    Stream(String),
}

/// Plays a mono PCM buffer to completion
#[async_trait]
pub trait TonePlayer: Send + Sync {
    async fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<(), ToneError>;
}
