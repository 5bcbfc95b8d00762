//! # Alert Signatures Module
//!
//! Matches the peak of each analysed frame against a small table of known
//! tones (a doorbell, a phone ringer...). Each signature names a band of
//! bins and the minimum intensity the peak must exceed inside it.
//!
//! At most one alert is active at a time: a new match replaces the
//! previous one.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::analysis::Peak;

/// A tone the device should react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSignature {
    pub name: String,
    /// Nominal frequency in Hz. Informational; matching uses the bins.
    pub frequency_hz: u16,
    /// First bin of the band (inclusive).
    pub bin_min: usize,
    /// Last bin of the band (inclusive).
    pub bin_max: usize,
    /// The peak must be strictly above this intensity.
    pub min_intensity: f32,
}

impl AlertSignature {
    pub fn matches(&self, peak: &Peak) -> bool {
        (self.bin_min..=self.bin_max).contains(&peak.bin) && peak.intensity > self.min_intensity
    }
}

/// Signatures calibrated for 1024-sample frames at roughly 16 kHz.
static DEFAULT_SIGNATURES: Lazy<Vec<AlertSignature>> = Lazy::new(|| {
    vec![
        AlertSignature {
            name: "door".to_string(),
            frequency_hz: 1400,
            bin_min: 92,
            bin_max: 93,
            min_intensity: 40_000.0,
        },
        AlertSignature {
            name: "phone".to_string(),
            frequency_hz: 1300,
            bin_min: 85,
            bin_max: 86,
            min_intensity: 20_000.0,
        },
    ]
});

/// Default signature table.
pub fn default_signatures() -> Vec<AlertSignature> {
    DEFAULT_SIGNATURES.clone()
}

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMatch {
    /// Position of the signature in the table.
    pub index: usize,
    pub name: String,
    pub frequency_hz: u16,
    pub bin: usize,
    /// Intensity of the peak that triggered the alert.
    pub intensity: f32,
}

/// Signature table plus the alert currently being shown.
#[derive(Debug, Clone)]
pub struct AlertTable {
    signatures: Vec<AlertSignature>,
    active: Option<AlertMatch>,
}

impl AlertTable {
    pub fn new(signatures: Vec<AlertSignature>) -> Self {
        Self {
            signatures,
            active: None,
        }
    }

    /// Checks `peak` against every signature.
    ///
    /// When several signatures match, the last one in table order wins and
    /// becomes the only active alert. Without a match `None` is returned and
    /// the previously active alert is kept as it was.
    pub fn evaluate(&mut self, peak: &Peak) -> Option<AlertMatch> {
        let (index, signature) = self
            .signatures
            .iter()
            .enumerate()
            .rev()
            .find(|(_, signature)| signature.matches(peak))?;

        let found = AlertMatch {
            index,
            name: signature.name.clone(),
            frequency_hz: signature.frequency_hz,
            bin: peak.bin,
            intensity: peak.intensity,
        };
        self.active = Some(found.clone());
        Some(found)
    }

    /// The most recent match, if any.
    pub fn active(&self) -> Option<&AlertMatch> {
        self.active.as_ref()
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

impl Default for AlertTable {
    fn default() -> Self {
        Self::new(default_signatures())
    }
}
