use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AudioConfig;

/// Audio capture errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// No default input device is available
    #[error("no input device available")]
    NoDevice,

    /// The input stream could not be built at the requested format
    #[error("failed to build input stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    /// The input stream could not be started
    #[error("failed to start input stream: {0}")]
    Start(#[from] cpal::PlayStreamError),
}

/// Convert f32 samples in [-1.0, 1.0] to 16-bit signed PCM (pure, testable)
#[must_use]
#[allow(clippy::cast_possible_truncation)] // clamped to the i16 range first
pub fn pcm_f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
        .collect()
}

/// A live microphone stream feeding PCM chunks into a channel
///
/// The cpal callback runs on the audio subsystem's own thread and only
/// converts and enqueues; recognition happens on the consumer side.
/// Dropping this value closes the stream.
pub struct CaptureStream {
    // Kept alive to keep the device open
    _stream: cpal::Stream,
}

impl CaptureStream {
    /// Opens the default input device as mono at the configured rate
    ///
    /// `fault` is raised if the stream errors mid-session, so the
    /// consumer loop can abort.
    ///
    /// # Errors
    /// Returns error if no input device exists or the stream cannot be
    /// built or started at the requested format.
    pub fn open(
        config: &AudioConfig,
        chunks: Sender<Vec<i16>>,
        fault: Arc<AtomicBool>,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        let device_name = device.name().unwrap_or_else(|_| "unknown".to_owned());
        info!("using input device: {}", device_name);

        let stream_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Non-blocking handoff; the channel is unbounded
                if chunks.send(pcm_f32_to_i16(data)).is_err() {
                    // Consumer already exited; chunk dropped
                }
            },
            move |err| {
                warn!("audio stream error: {}", err);
                fault.store(true, Ordering::Relaxed);
            },
            None,
        )?;

        stream.play()?;
        info!(
            sample_rate = config.sample_rate,
            "audio capture stream started"
        );

        Ok(Self { _stream: stream })
    }
}

/// Re-blocks arbitrarily sized callback chunks into fixed-size feeds
///
/// Device callback granularity varies; the recognizer is fed in blocks
/// of exactly `block_size` frames, with the remainder held until the
/// next push or the final `flush`.
pub struct ChunkBlocker {
    buf: Vec<i16>,
    block_size: usize,
}

impl ChunkBlocker {
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self {
            buf: Vec::with_capacity(block_size * 2),
            block_size,
        }
    }

    /// Absorb a chunk and return the complete blocks now available
    pub fn push(&mut self, chunk: &[i16]) -> Vec<Vec<i16>> {
        self.buf.extend_from_slice(chunk);

        let mut blocks = Vec::new();
        while self.buf.len() >= self.block_size {
            let rest = self.buf.split_off(self.block_size);
            blocks.push(std::mem::replace(&mut self.buf, rest));
        }
        blocks
    }

    /// Return the buffered remainder, if any
    pub fn flush(&mut self) -> Option<Vec<i16>> {
        if self.buf.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buf))
        }
    }
}
