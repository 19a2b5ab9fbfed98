//! Activation cue and volume key presses

use std::f32::consts::PI;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::actions::{ActionError, Desktop, SystemKey};

use super::TonePlayer;

/// Sample rate of the synthesized cue
pub const CUE_SAMPLE_RATE: u32 = 22050;

/// Volume key presses used to duck output while listening
pub const DUCK_STEPS: u32 = 8;

const CUE_AMPLITUDE: f32 = 20000.0 / 32768.0;
const HIGH_TONE: (f32, Duration) = (1200.0, Duration::from_millis(80));
const GAP: Duration = Duration::from_millis(30);
const LOW_TONE: (f32, Duration) = (900.0, Duration::from_millis(80));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeDirection {
    Up,
    Down,
}

/// How the cue was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueOutcome {
    Played,
    /// Tone playback failed; a terminal bell was written instead
    Bell,
}

/// Plays cues and adjusts system volume
pub struct AudioFeedback {
    player: Box<dyn TonePlayer>,
    desktop: Arc<dyn Desktop>,
}

impl AudioFeedback {
    pub fn new(player: Box<dyn TonePlayer>, desktop: Arc<dyn Desktop>) -> Self {
        Self { player, desktop }
    }

    /// Play the two-tone descending cue
    pub async fn cue(&self) -> CueOutcome {
        match self.player.play(cue_samples(), CUE_SAMPLE_RATE).await {
            Ok(()) => CueOutcome::Played,
            Err(e) => {
                warn!(error = %e, "cue playback failed, using terminal bell");
                let mut stdout = std::io::stdout();
                let _ = stdout.write_all(b"\x07");
                let _ = stdout.flush();
                CueOutcome::Bell
            }
        }
    }

    /// Press the volume key `steps` times
    pub fn adjust_volume(&self, direction: VolumeDirection, steps: u32) -> Result<(), ActionError> {
        let key = match direction {
            VolumeDirection::Up => SystemKey::VolumeUp,
            VolumeDirection::Down => SystemKey::VolumeDown,
        };

        debug!(?direction, steps, "adjusting volume");
        for _ in 0..steps {
            self.desktop.press_key(key)?;
        }
        Ok(())
    }
}

/// High tone, short silence, lower tone
pub fn cue_samples() -> Vec<f32> {
    let mut samples = tone(HIGH_TONE.0, HIGH_TONE.1);
    samples.extend(std::iter::repeat(0.0).take(sample_count(GAP)));
    samples.extend(tone(LOW_TONE.0, LOW_TONE.1));
    samples
}

fn sample_count(duration: Duration) -> usize {
    (f64::from(CUE_SAMPLE_RATE) * duration.as_secs_f64()) as usize
}

fn tone(frequency: f32, duration: Duration) -> Vec<f32> {
    let rate = CUE_SAMPLE_RATE as f32;
    (0..sample_count(duration))
        .map(|i| CUE_AMPLITUDE * (2.0 * PI * frequency * i as f32 / rate).sin())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, FakeDesktop, FakeTonePlayer};

    #[test]
    fn test_cue_shape() {
        let samples = cue_samples();
        assert_eq!(samples.len(), 1764 + 661 + 1764);
        assert!(samples[1764..1764 + 661].iter().all(|s| *s == 0.0));
        assert!(samples.iter().all(|s| s.abs() <= CUE_AMPLITUDE));
    }

    #[test]
    fn test_cue_is_bounded() {
        let duration = cue_samples().len() as f64 / f64::from(CUE_SAMPLE_RATE);
        assert!(duration <= 0.2, "cue lasts {duration}s");
    }

    #[tokio::test]
    async fn test_cue_plays_through_player() {
        let log = CallLog::default();
        let feedback = AudioFeedback::new(
            Box::new(FakeTonePlayer::new(&log)),
            Arc::new(FakeDesktop::new(&log)),
        );
        assert_eq!(feedback.cue().await, CueOutcome::Played);
        assert_eq!(log.count("cue"), 1);
    }

    #[tokio::test]
    async fn test_cue_falls_back_to_bell() {
        let log = CallLog::default();
        let feedback = AudioFeedback::new(
            Box::new(FakeTonePlayer::failing(&log)),
            Arc::new(FakeDesktop::new(&log)),
        );
        assert_eq!(feedback.cue().await, CueOutcome::Bell);
    }

    #[test]
    fn test_adjust_volume_presses_keys() {
        let log = CallLog::default();
        let feedback = AudioFeedback::new(
            Box::new(FakeTonePlayer::new(&log)),
            Arc::new(FakeDesktop::new(&log)),
        );
        feedback.adjust_volume(VolumeDirection::Down, DUCK_STEPS).unwrap();
        feedback.adjust_volume(VolumeDirection::Up, 2).unwrap();
        assert_eq!(log.count("key:VolumeDown"), 8);
        assert_eq!(log.count("key:VolumeUp"), 2);
    }
}
