//! # Audio Capture Module
//!
//! Microphone capture through CPAL (Cross-Platform Audio Library). The input
//! callback accumulates samples and hands complete, fixed-length frames to
//! the analysis side over a channel.
//!
//! ## Features
//! - Default input device selection
//! - Mono f32 configuration closest to the requested rate
//! - Frames dropped rather than queued when the consumer lags

use anyhow::{Context, Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Sender, TrySendError};

/// Starts audio capture from the default input device.
///
/// # Arguments
/// * `sender` - Channel receiving one `Vec<f32>` per complete frame
/// * `frame_len` - Samples per frame, normally the transform length
/// * `target_rate` - Requested sample rate in Hz
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream and the rate actually used
/// * `Err(e)` - No device, no usable format, or the stream failed to start
///
/// The stream stops when the returned handle is dropped.
pub fn start_audio_capture(
    sender: Sender<Vec<f32>>,
    frame_len: usize,
    target_rate: u32,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    log::info!("Using audio input device: {}", device.name()?);

    let configs = device
        .supported_input_configs()
        .context("querying input configurations")?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, target_rate)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = target_rate.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    log::info!("Selected sample rate: {} Hz", sample_rate);

    let err_fn = |err| log::error!("An error occurred on the audio stream: {}", err);

    let mut framer = Framer::new(frame_len);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                framer.push(data, |frame| match sender.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => log::warn!("Analysis lagging, frame dropped"),
                    Err(TrySendError::Disconnected(_)) => {}
                });
            },
            err_fn,
            None,
        )
        .context("building input stream")?;

    stream.play().context("starting input stream")?;

    Ok((stream, sample_rate))
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Only mono 32-bit float configurations qualify; among those the one whose
/// rate range lies closest to `target_rate` wins.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| rate_distance(c.min_sample_rate().0, c.max_sample_rate().0, target_rate))
}

/// Distance from `target` to the range `[min, max]`, zero when inside it.
fn rate_distance(min: u32, max: u32, target: u32) -> u32 {
    if target < min {
        min - target
    } else {
        target.saturating_sub(max)
    }
}

/// Cuts a continuous sample stream into frames of a fixed length.
#[derive(Debug)]
pub struct Framer {
    frame_len: usize,
    pending: Vec<f32>,
}

impl Framer {
    pub fn new(frame_len: usize) -> Self {
        Self {
            frame_len,
            pending: Vec::with_capacity(frame_len * 2),
        }
    }

    /// Appends `data` and calls `emit` once for every complete frame.
    /// Leftover samples wait for the next call.
    pub fn push(&mut self, data: &[f32], mut emit: impl FnMut(Vec<f32>)) {
        if self.frame_len == 0 {
            return;
        }
        self.pending.extend_from_slice(data);
        while self.pending.len() >= self.frame_len {
            emit(self.pending[..self.frame_len].to_vec());
            self.pending.drain(..self.frame_len);
        }
    }

    /// Samples waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framer_emits_complete_frames_in_order() {
        let mut framer = Framer::new(4);
        let mut frames = Vec::new();

        framer.push(&[1.0, 2.0, 3.0], |f| frames.push(f));
        assert!(frames.is_empty());
        assert_eq!(framer.pending(), 3);

        framer.push(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0], |f| frames.push(f));
        assert_eq!(frames, vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]]);
        assert_eq!(framer.pending(), 1);
    }

    #[test]
    fn framer_feeds_a_bounded_channel() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut framer = Framer::new(2);
        framer.push(&[0.5; 6], |f| {
            let _ = tx.try_send(f);
        });
        assert_eq!(rx.try_recv().unwrap(), vec![0.5, 0.5]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rate_distance_is_zero_inside_range() {
        assert_eq!(rate_distance(8_000, 48_000, 16_000), 0);
        assert_eq!(rate_distance(44_100, 48_000, 16_000), 28_100);
        assert_eq!(rate_distance(8_000, 11_025, 16_000), 4_975);
    }
}
