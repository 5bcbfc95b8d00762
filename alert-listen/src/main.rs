//! # Alert Listen - Sound Alert Listener
//!
//! Captures the default microphone, transforms every frame and reports when
//! a configured alert tone is heard.
//!
//! ## Architecture
//! - **Audio callback**: CPAL thread cutting the stream into frames
//! - **Main thread**: analysis, alert matching and reporting
//! - **Communication**: bounded crossbeam channel; late frames are dropped
//!
//! ## Usage
//! `alert-listen [CONFIG.json] [--mode listen|info|bars|spectrogram|envelope]`
//!
//! Logging is controlled through `RUST_LOG` (e.g. `RUST_LOG=debug`).

mod report;

use alert_core::{
    Analyzer, AlertTable, ListenConfig, PeakHistogram, audio, process_frame, visual,
    visual::{Envelope, PeakHold},
};
use anyhow::{Context, Result, bail};
use cpal::traits::StreamTrait;
use crossbeam_channel::Receiver;
use std::time::Duration;

/// Frames buffered between the audio callback and the analysis loop.
const FRAME_QUEUE: usize = 4;

/// Lowest bin considered when ranking the most frequent peaks.
const HISTOGRAM_FROM_BIN: usize = 30;

/// Peak intensity above which the best-three ranking is refreshed.
const HISTOGRAM_MIN_INTENSITY: f32 = 20_000.0;

/// What to print for each analysed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Report alerts only.
    Listen,
    /// Peak bin, intensity, frequency and the most frequent peaks.
    Info,
    /// A coarse bar spectrum with peak-hold markers.
    Bars,
    /// One spectrogram line per frame, time running down the terminal.
    Spectrogram,
    /// Amplitude envelope of the raw samples.
    Envelope,
}

impl Mode {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "listen" => Ok(Mode::Listen),
            "info" => Ok(Mode::Info),
            "bars" => Ok(Mode::Bars),
            "spectrogram" => Ok(Mode::Spectrogram),
            "envelope" => Ok(Mode::Envelope),
            other => bail!(
                "unknown mode '{}', expected listen, info, bars, spectrogram or envelope",
                other
            ),
        }
    }
}

struct Args {
    config_path: Option<String>,
    mode: Mode,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut config_path = None;
    let mut mode = Mode::Listen;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--mode" {
            let value = args.next().context("--mode needs a value")?;
            mode = Mode::parse(&value)?;
        } else if config_path.is_none() {
            config_path = Some(arg);
        } else {
            bail!("unexpected argument '{}'", arg);
        }
    }
    Ok(Args { config_path, mode })
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = match &args.config_path {
        Some(path) => ListenConfig::load(path)?,
        None => ListenConfig::default(),
    };
    config.validate().context("invalid configuration")?;

    log::info!(
        "Listening with {} samples per frame, {:?} window, {} alert(s)",
        config.samples(),
        config.window,
        config.alerts.len()
    );

    let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Vec<f32>>(FRAME_QUEUE);
    let (stream, sample_rate) =
        audio::start_audio_capture(frame_tx, config.samples(), config.sample_rate_hz)?;
    if sample_rate != config.sample_rate_hz {
        log::warn!(
            "Capturing at {} Hz instead of {} Hz; alert bins may be off",
            sample_rate,
            config.sample_rate_hz
        );
    }

    let result = run(&config, args.mode, &frame_rx);

    if let Err(e) = stream.pause() {
        log::warn!("Error pausing stream: {}", e);
    }
    drop(stream);
    log::info!("Listener stopped");
    result
}

/// Consumes frames until the stream closes or `max_cycles` is reached.
fn run(config: &ListenConfig, mode: Mode, frames: &Receiver<Vec<f32>>) -> Result<()> {
    let mut analyzer = Analyzer::new(config.log2_samples, config.window);
    let mut alerts = AlertTable::new(config.alerts.clone());
    let mut histogram = PeakHistogram::new(config.samples());
    let mut peak_hold = PeakHold::new(report::BAR_COUNT, report::BAR_HEIGHT);
    let mut envelope = Envelope::new(
        report::ENVELOPE_SILENCE,
        report::ENVELOPE_FULL_SCALE,
        report::BAR_HEIGHT as i32,
    );
    let timeout = Duration::from_millis(config.frame_timeout_ms);
    let mut cycles: u64 = 0;
    let mut last_alert: Option<usize> = None;

    loop {
        if config.max_cycles.is_some_and(|max| cycles >= max) {
            log::info!("Reached {} cycles", cycles);
            return Ok(());
        }

        let frame = crossbeam_channel::select! {
            recv(frames) -> msg => match msg {
                Ok(frame) => frame,
                Err(_) => {
                    log::info!("Audio channel closed");
                    return Ok(());
                }
            },
            default(timeout) => {
                log::warn!("No audio frame for {:?}", timeout);
                continue;
            }
        };
        cycles += 1;

        let result = process_frame(&mut analyzer, &mut alerts, &frame, config);
        log::debug!(
            "Cycle {}: peak bin {} ({:.0} Hz) intensity {:.0}",
            cycles,
            result.peak.bin,
            result.peak_hz,
            result.peak.intensity
        );

        match &result.alert {
            Some(alert) if last_alert != Some(alert.index) => {
                log::info!("Alert '{}' detected", alert.name);
                println!("{}", report::alert_line(alert, config.bin_width()));
                last_alert = Some(alert.index);
            }
            Some(_) => {}
            None => last_alert = None,
        }

        match mode {
            Mode::Listen => {}
            Mode::Info => {
                histogram.record(result.peak.bin);
                let best = if result.peak.intensity > HISTOGRAM_MIN_INTENSITY {
                    histogram.top(3, HISTOGRAM_FROM_BIN)
                } else {
                    Vec::new()
                };
                println!("{}", report::info_line(&result, &best));
            }
            Mode::Bars => {
                let bars = visual::spectrum_bars(
                    analyzer.spectrum(),
                    report::BAR_COUNT,
                    report::BINS_PER_BAR,
                    report::FIRST_BAR_BIN,
                    report::BAR_FULL_SCALE,
                    report::BAR_HEIGHT,
                );
                let held = peak_hold.update(&bars);
                println!("{}", report::bars_line(&bars, &held));
            }
            Mode::Spectrogram => {
                let column = visual::spectrogram_column(
                    analyzer.spectrum(),
                    report::SPECTROGRAM_ROWS,
                    report::SPECTROGRAM_FIRST_BIN,
                    report::SPECTROGRAM_FULL_SCALE,
                    report::SPECTROGRAM_LEVELS,
                );
                println!("{}", report::spectrogram_line(&column));
            }
            Mode::Envelope => {
                let counts = adc_counts(&frame, config.input_gain);
                let levels: Vec<i32> = counts
                    .chunks(report::ENVELOPE_BURST)
                    .map(|burst| envelope.push(burst))
                    .collect();
                println!(
                    "{}",
                    report::envelope_line(
                        &levels,
                        envelope.min(),
                        envelope.max(),
                        report::BAR_HEIGHT as i32
                    )
                );
            }
        }
    }
}

/// Maps float samples onto the ADC-like counts the envelope thresholds
/// are expressed in, centred on the silence level.
fn adc_counts(frame: &[f32], gain: f32) -> Vec<i32> {
    frame
        .iter()
        .map(|&s| report::ENVELOPE_SILENCE.saturating_add((s * gain) as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_config_and_mode() {
        let parsed = parse_args(args(&["cfg.json", "--mode", "info"])).unwrap();
        assert_eq!(parsed.config_path.as_deref(), Some("cfg.json"));
        assert_eq!(parsed.mode, Mode::Info);

        let parsed = parse_args(args(&[])).unwrap();
        assert!(parsed.config_path.is_none());
        assert_eq!(parsed.mode, Mode::Listen);

        let parsed = parse_args(args(&["--mode", "spectrogram"])).unwrap();
        assert_eq!(parsed.mode, Mode::Spectrogram);
        let parsed = parse_args(args(&["--mode", "envelope", "cfg.json"])).unwrap();
        assert_eq!(parsed.mode, Mode::Envelope);
        assert_eq!(parsed.config_path.as_deref(), Some("cfg.json"));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(args(&["--mode"])).is_err());
        assert!(parse_args(args(&["--mode", "loud"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
    }

    #[test]
    fn run_stops_after_max_cycles() {
        let config = ListenConfig {
            log2_samples: 7,
            alerts: Vec::new(),
            max_cycles: Some(2),
            frame_timeout_ms: 10,
            ..Default::default()
        };
        let (tx, rx) = crossbeam_channel::bounded(4);
        for _ in 0..3 {
            tx.send(vec![0.0; 128]).unwrap();
        }
        run(&config, Mode::Bars, &rx).unwrap();
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn run_ends_when_capture_stops() {
        let config = ListenConfig {
            log2_samples: 7,
            alerts: Vec::new(),
            ..Default::default()
        };
        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(vec![0.0; 128]).unwrap();
        drop(tx);
        run(&config, Mode::Info, &rx).unwrap();
    }

    #[test]
    fn every_mode_survives_saturated_frames() {
        let config = ListenConfig {
            log2_samples: 7,
            input_gain: 1e30,
            max_cycles: Some(3),
            frame_timeout_ms: 10,
            alerts: Vec::new(),
            ..Default::default()
        };
        let tone: Vec<f32> = (0..128)
            .map(|i| (2.0 * std::f32::consts::PI * 9.0 * i as f32 / 128.0).sin())
            .collect();
        for mode in [
            Mode::Listen,
            Mode::Info,
            Mode::Bars,
            Mode::Spectrogram,
            Mode::Envelope,
        ] {
            let (tx, rx) = crossbeam_channel::bounded(4);
            for _ in 0..3 {
                tx.send(tone.clone()).unwrap();
            }
            run(&config, mode, &rx).unwrap();
        }
    }

    #[test]
    fn adc_counts_centre_on_silence_and_saturate() {
        assert_eq!(adc_counts(&[0.0, 0.5, -0.5], 2048.0), vec![1450, 2474, 426]);
        assert_eq!(adc_counts(&[1.0, -1.0], f32::MAX), vec![i32::MAX, 1450 + i32::MIN]);
    }
}
