//! Energy-based speech segmentation
//!
//! Decides from raw mono samples when an utterance starts and ends.
//! Time is counted in samples fed, so the segmenter is deterministic
//! and independent of the audio callback cadence.

use std::time::Duration;

use super::CaptureLimits;

/// Tunables for the segmenter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmenterSettings {
    pub sample_rate: u32,
    /// Leading audio used to measure background noise
    pub calibration: Duration,
    /// Lowest RMS treated as speech
    pub energy_floor: f32,
    /// Threshold multiplier over the ambient RMS
    pub ambient_factor: f32,
    /// Trailing silence that ends a phrase
    pub pause: Duration,
}

impl SegmenterSettings {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            calibration: Duration::from_millis(500),
            energy_floor: 300.0 / 32768.0,
            ambient_factor: 1.5,
            pause: Duration::from_millis(800),
        }
    }

    fn samples(&self, duration: Duration) -> usize {
        (duration.as_secs_f64() * f64::from(self.sample_rate)).round() as usize
    }
}

/// Outcome of feeding one chunk
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentStatus {
    /// Still waiting for or inside an utterance
    Listening,
    /// Utterance finished; carries its samples
    Complete(Vec<f32>),
    /// Start-of-speech timeout elapsed
    TimedOut,
}

#[derive(Debug)]
enum Phase {
    Calibrating { seen: usize, energy: f64 },
    Waiting { waited: usize },
    Recording { samples: Vec<f32>, silence: usize },
    Done,
}

/// Splits a sample stream into one utterance
#[derive(Debug)]
pub struct SpeechSegmenter {
    phase: Phase,
    threshold: f32,
    floor: f32,
    factor: f32,
    calibration_samples: usize,
    pause_samples: usize,
    limit_samples: usize,
    timeout_samples: Option<usize>,
}

impl SpeechSegmenter {
    pub fn new(settings: SegmenterSettings, limits: CaptureLimits) -> Self {
        let calibration_samples = settings.samples(settings.calibration);
        let phase = if calibration_samples == 0 {
            Phase::Waiting { waited: 0 }
        } else {
            Phase::Calibrating { seen: 0, energy: 0.0 }
        };

        Self {
            phase,
            threshold: settings.energy_floor,
            floor: settings.energy_floor,
            factor: settings.ambient_factor,
            calibration_samples,
            pause_samples: settings.samples(settings.pause),
            limit_samples: settings.samples(limits.phrase_limit).max(1),
            timeout_samples: limits.start_timeout.map(|t| settings.samples(t)),
        }
    }

    /// Current speech threshold
    #[cfg(test)]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether an utterance has started
    #[cfg(test)]
    pub fn is_recording(&self) -> bool {
        matches!(self.phase, Phase::Recording { .. })
    }

    /// Feed the next chunk of mono samples
    pub fn feed(&mut self, chunk: &[f32]) -> SegmentStatus {
        if chunk.is_empty() {
            return SegmentStatus::Listening;
        }
        let level = rms(chunk);

        match &mut self.phase {
            Phase::Calibrating { seen, energy } => {
                *seen += chunk.len();
                *energy += chunk.iter().map(|s| f64::from(*s) * f64::from(*s)).sum::<f64>();
                if *seen >= self.calibration_samples {
                    let ambient = (*energy / *seen as f64).sqrt() as f32;
                    self.threshold = (ambient * self.factor).max(self.floor);
                    self.phase = Phase::Waiting { waited: 0 };
                }
                SegmentStatus::Listening
            }
            Phase::Waiting { waited } => {
                if level > self.threshold {
                    let samples = chunk.to_vec();
                    self.phase = Phase::Recording { samples, silence: 0 };
                    return self.check_recording();
                }

                // Track slowly drifting background noise
                self.threshold = (0.95 * self.threshold + 0.05 * level * self.factor).max(self.floor);

                *waited += chunk.len();
                match self.timeout_samples {
                    Some(limit) if *waited >= limit => {
                        self.phase = Phase::Done;
                        SegmentStatus::TimedOut
                    }
                    _ => SegmentStatus::Listening,
                }
            }
            Phase::Recording { samples, silence } => {
                samples.extend_from_slice(chunk);
                if level > self.threshold {
                    *silence = 0;
                } else {
                    *silence += chunk.len();
                }
                self.check_recording()
            }
            Phase::Done => SegmentStatus::Listening,
        }
    }

    fn check_recording(&mut self) -> SegmentStatus {
        let Phase::Recording { samples, silence } = &mut self.phase else {
            return SegmentStatus::Listening;
        };

        if *silence >= self.pause_samples || samples.len() >= self.limit_samples {
            let samples = std::mem::take(samples);
            self.phase = Phase::Done;
            SegmentStatus::Complete(samples)
        } else {
            SegmentStatus::Listening
        }
    }
}

/// Root-mean-square level of a chunk
pub fn rms(chunk: &[f32]) -> f32 {
    if chunk.is_empty() {
        return 0.0;
    }
    let sum: f32 = chunk.iter().map(|s| s * s).sum();
    (sum / chunk.len() as f32).sqrt()
}
