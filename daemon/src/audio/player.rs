//! Tone playback on the default output device

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error};

use super::{ToneError, TonePlayer};

/// Extra time allowed for the device buffer to drain
const DRAIN_MARGIN: Duration = Duration::from_millis(40);

/// Plays short buffers through cpal, resampling to the device rate
#[derive(Debug, Default)]
pub struct CpalTonePlayer;

impl CpalTonePlayer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TonePlayer for CpalTonePlayer {
    async fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<(), ToneError> {
        tokio::task::spawn_blocking(move || play_blocking(&samples, sample_rate))
            .await
            .map_err(|e| ToneError::Stream(e.to_string()))?
    }
}

fn play_blocking(samples: &[f32], source_rate: u32) -> Result<(), ToneError> {
    if samples.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(ToneError::NoDevice)?;
    let supported = device
        .default_output_config()
        .map_err(|e| ToneError::Stream(e.to_string()))?;
    let device_rate = supported.sample_rate().0;
    let channels = usize::from(supported.channels().max(1));

    let frames = Arc::new(resample(samples, source_rate, device_rate));
    let position = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let stream = {
        let frames = Arc::clone(&frames);
        let position = Arc::clone(&position);
        let finished = Arc::clone(&finished);

        device
            .build_output_stream(
                &supported.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let pos = position.fetch_add(1, Ordering::Relaxed);
                        let sample = frames.get(pos).copied().unwrap_or_else(|| {
                            finished.store(true, Ordering::Relaxed);
                            0.0
                        });
                        frame.fill(sample);
                    }
                },
                |err| {
                    error!(error = %err, "tone playback error");
                },
                None,
            )
            .map_err(|e| ToneError::Stream(e.to_string()))?
    };

    stream.play().map_err(|e| ToneError::Stream(e.to_string()))?;

    let length = Duration::from_secs_f64(samples.len() as f64 / f64::from(source_rate.max(1)));
    let deadline = Instant::now() + length + DRAIN_MARGIN;
    while !finished.load(Ordering::Relaxed) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }

    drop(stream);
    debug!(samples = samples.len(), device_rate, "tone played");
    Ok(())
}

/// Nearest-sample rate conversion, adequate for short sine cues
fn resample(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let out_len = (samples.len() as u64 * u64::from(to) / u64::from(from)) as usize;
    (0..out_len)
        .map(|i| {
            let src = (i as u64 * u64::from(from) / u64::from(to)) as usize;
            samples[src.min(samples.len() - 1)]
        })
        .collect()
}
