//! Microphone capture using cpal
//!
//! Runs the input stream on the calling (blocking) thread and feeds
//! downmixed chunks to a [`SpeechSegmenter`] until one utterance is done.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error};

use super::segmenter::{SegmentStatus, SegmenterSettings, SpeechSegmenter};
use super::{CaptureLimits, TranscriptionError};

/// How often the capture loop checks for cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Longest gap between callbacks before the stream counts as stalled
const STALL_TIMEOUT: Duration = Duration::from_secs(3);

/// One captured utterance
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Recording {
    /// Encode as 16-bit mono WAV
    pub fn to_wav(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in &self.samples {
                let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                writer.write_sample(value)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate.max(1)))
    }
}

/// The default input device
#[derive(Debug, Default)]
pub struct Microphone;

impl Microphone {
    pub fn new() -> Self {
        Self
    }

    /// Record one utterance, blocking until it ends, times out or `cancel` is set
    pub fn record(
        &self,
        limits: CaptureLimits,
        cancel: &AtomicBool,
    ) -> Result<Recording, TranscriptionError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| TranscriptionError::Microphone("no input device available".to_string()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| TranscriptionError::Microphone(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = usize::from(supported.channels().max(1));

        debug!(
            device = device.name().unwrap_or_default(),
            sample_rate,
            channels,
            "opening microphone"
        );

        let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<f32>>();
        let stream = device
            .build_input_stream(
                &supported.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono = data
                        .chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                        .collect();
                    let _ = chunk_tx.send(mono);
                },
                |err| {
                    error!(error = %err, "microphone stream error");
                },
                None,
            )
            .map_err(|e| TranscriptionError::Microphone(e.to_string()))?;

        stream
            .play()
            .map_err(|e| TranscriptionError::Microphone(e.to_string()))?;

        let mut segmenter = SpeechSegmenter::new(SegmenterSettings::new(sample_rate), limits);
        let mut idle = Duration::ZERO;

        // Stream stops when it goes out of scope
        loop {
            if cancel.load(Ordering::SeqCst) {
                debug!("capture cancelled");
                return Err(TranscriptionError::NoSpeechDetected);
            }

            match chunk_rx.recv_timeout(POLL_INTERVAL) {
                Ok(chunk) => {
                    idle = Duration::ZERO;
                    match segmenter.feed(&chunk) {
                        SegmentStatus::Listening => {}
                        SegmentStatus::TimedOut => return Err(TranscriptionError::NoSpeechDetected),
                        SegmentStatus::Complete(samples) => {
                            let recording = Recording { samples, sample_rate };
                            debug!(duration_ms = recording.duration().as_millis() as u64, "utterance captured");
                            return Ok(recording);
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    idle += POLL_INTERVAL;
                    if idle >= STALL_TIMEOUT {
                        return Err(TranscriptionError::Microphone(
                            "input stream stalled".to_string(),
                        ));
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(TranscriptionError::Microphone(
                        "input stream closed".to_string(),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_encoding() {
        let recording = Recording {
            samples: vec![0.0, 1.0, -1.0, 2.0],
            sample_rate: 16000,
        };
        let wav = recording.to_wav().unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![0, i16::MAX, -i16::MAX, i16::MAX]);
    }

    #[test]
    fn test_duration() {
        let recording = Recording {
            samples: vec![0.0; 8000],
            sample_rate: 16000,
        };
        assert_eq!(recording.duration(), Duration::from_millis(500));
    }
}
