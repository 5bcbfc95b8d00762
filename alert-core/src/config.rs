//! # Configuration Module
//!
//! Listening parameters, loaded from and saved to JSON. Every field has a
//! default, so a config file only needs the values it changes.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::alerts::{AlertSignature, default_signatures};
use crate::analysis::default_bin_width;
use crate::window::WindowKind;

/// Largest supported transform, `2^16` samples.
pub const MAX_LOG2_SAMPLES: u32 = 16;

/// Parameters of the listen loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Requested capture rate in Hz.
    pub sample_rate_hz: u32,
    /// Base-2 logarithm of the frame length.
    pub log2_samples: u32,
    /// Window applied before every forward transform.
    pub window: WindowKind,
    /// Factor applied to captured samples, mapping the `[-1, 1]` float
    /// range onto ADC-like counts so alert thresholds stay comparable.
    pub input_gain: f32,
    /// Measured width of one bin in Hz; `sample_rate_hz / N` when unset.
    pub bin_width_hz: Option<f32>,
    pub alerts: Vec<AlertSignature>,
    /// Stop after this many frames; run until the stream ends when unset.
    pub max_cycles: Option<u64>,
    /// How long to wait for a frame before reporting a stalled stream.
    pub frame_timeout_ms: u64,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 16_000,
            log2_samples: 10,
            window: WindowKind::Hamming,
            input_gain: 2048.0,
            bin_width_hz: None,
            alerts: default_signatures(),
            max_cycles: None,
            frame_timeout_ms: 1000,
        }
    }
}

impl ListenConfig {
    /// Frame length in samples.
    pub fn samples(&self) -> usize {
        1 << self.log2_samples
    }

    /// Effective bin width in Hz.
    pub fn bin_width(&self) -> f32 {
        self.bin_width_hz
            .unwrap_or_else(|| default_bin_width(self.sample_rate_hz, self.samples()))
    }

    /// Checks the values a JSON file could get wrong.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LOG2_SAMPLES).contains(&self.log2_samples) {
            bail!(
                "log2_samples must be between 1 and {}, got {}",
                MAX_LOG2_SAMPLES,
                self.log2_samples
            );
        }
        if self.sample_rate_hz == 0 {
            bail!("sample_rate_hz must be positive");
        }
        if !self.input_gain.is_finite() || self.input_gain <= 0.0 {
            bail!("input_gain must be positive and finite, got {}", self.input_gain);
        }
        if let Some(width) = self.bin_width_hz {
            if !width.is_finite() || width <= 0.0 {
                bail!("bin_width_hz must be positive and finite, got {}", width);
            }
        }
        // Peaks are only searched up to the Nyquist bin.
        let nyquist = self.samples() / 2;
        for alert in &self.alerts {
            if alert.bin_min == 0 || alert.bin_min > alert.bin_max || alert.bin_max > nyquist {
                bail!(
                    "alert '{}' has bins {}..={}, expected a band inside 1..={}",
                    alert.name,
                    alert.bin_min,
                    alert.bin_max,
                    nyquist
                );
            }
        }
        Ok(())
    }

    /// Loads a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file =
            File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let mut data = String::new();
        file.read_to_string(&mut data)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ListenConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Saves the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json_string = serde_json::to_string_pretty(self).context("serializing config")?;
        let mut file =
            File::create(path).with_context(|| format!("creating config {}", path.display()))?;
        file.write_all(json_string.as_bytes())
            .with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ListenConfig::default();
        config.validate().unwrap();
        assert_eq!(config.samples(), 1024);
        assert_eq!(config.bin_width(), 15.625);
        assert_eq!(config.alerts.len(), 2);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: ListenConfig =
            serde_json::from_str(r#"{ "log2_samples": 7, "window": "blackman-harris", "bin_width_hz": 15.2256 }"#)
                .unwrap();
        assert_eq!(config.samples(), 128);
        assert_eq!(config.window, WindowKind::BlackmanHarris);
        assert_eq!(config.sample_rate_hz, 16_000);
        assert_eq!(config.bin_width(), 15.2256);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad_size = ListenConfig { log2_samples: 0, ..Default::default() };
        assert!(bad_size.validate().is_err());

        let bad_gain = ListenConfig { input_gain: 0.0, ..Default::default() };
        assert!(bad_gain.validate().is_err());

        let bad_rate = ListenConfig { sample_rate_hz: 0, ..Default::default() };
        assert!(bad_rate.validate().is_err());

        for gain in [f32::INFINITY, f32::NAN] {
            let bad_gain = ListenConfig { input_gain: gain, ..Default::default() };
            assert!(bad_gain.validate().is_err(), "gain {gain}");
        }

        // The default door alert sits at bins 92..=93, beyond a 64-bin frame.
        let small = ListenConfig { log2_samples: 6, ..Default::default() };
        let err = small.validate().unwrap_err();
        assert!(err.to_string().contains("door"), "{err}");
    }

    #[test]
    fn alert_bands_end_at_the_nyquist_bin() {
        let mut config = ListenConfig { log2_samples: 8, ..Default::default() };
        config.alerts[0].bin_min = 100;
        config.alerts[0].bin_max = 128;
        config.alerts[1].bin_min = 85;
        config.alerts[1].bin_max = 86;
        config.validate().unwrap();

        config.alerts[0].bin_max = 129;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("1..=128"), "{err}");
    }

    #[test]
    fn save_then_load_keeps_every_field() {
        let path = std::env::temp_dir().join(format!("alert-config-{}.json", std::process::id()));
        let config = ListenConfig {
            window: WindowKind::Welch,
            max_cycles: Some(12),
            bin_width_hz: Some(15.2256),
            ..Default::default()
        };

        config.save(&path).unwrap();
        let loaded = ListenConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ListenConfig::load("/nonexistent/alert-config.json").unwrap_err();
        assert!(err.to_string().contains("opening config"));
    }
}
