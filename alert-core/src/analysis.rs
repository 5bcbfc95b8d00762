//! # Analysis Cycle Module
//!
//! Turns one captured frame into a spectrum and extracts what the alert
//! logic needs from it.
//!
//! ## Cycle
//! 1. Load the frame into the reused complex buffer (real parts, scaled)
//! 2. Apply the forward window
//! 3. Bit-reverse, run the butterflies, zero the DC bin
//!
//! The spectrum is read back through its real parts, which the rest of the
//! system treats as the intensity of each bin.

use rustfft::num_complex::Complex;

use crate::fft::{TransformDirection, perform_transform};
use crate::window::{WindowKind, apply_window};

/// Strongest bin of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Bin index, 0 when no bin had a positive intensity.
    pub bin: usize,
    /// Real part of that bin.
    pub intensity: f32,
}

/// Owns the sample buffer for one analysis cycle at a time.
///
/// The buffer is allocated once and overwritten by every call to
/// [`Analyzer::analyze`], so a long-running listen loop never allocates.
#[derive(Debug, Clone)]
pub struct Analyzer {
    log2_n: u32,
    window: WindowKind,
    buffer: Vec<Complex<f32>>,
}

impl Analyzer {
    pub fn new(log2_n: u32, window: WindowKind) -> Self {
        Self {
            log2_n,
            window,
            buffer: vec![Complex::new(0.0, 0.0); 1 << log2_n],
        }
    }

    /// Runs one analysis cycle over `frame` and returns the spectrum.
    ///
    /// Each sample is multiplied by `gain` before windowing. A short frame
    /// is zero-padded and a long one is truncated to the buffer length.
    pub fn analyze(&mut self, frame: &[f32], gain: f32) -> &[Complex<f32>] {
        if frame.len() != self.buffer.len() {
            log::debug!(
                "Frame of {} samples fitted to buffer of {}",
                frame.len(),
                self.buffer.len()
            );
        }

        let padded = frame.iter().copied().chain(std::iter::repeat(0.0));
        for (slot, sample) in self.buffer.iter_mut().zip(padded) {
            *slot = Complex::new(sample * gain, 0.0);
        }

        apply_window(&mut self.buffer, self.log2_n, self.window, TransformDirection::Forward);
        perform_transform(&mut self.buffer, self.log2_n, TransformDirection::Forward);
        &self.buffer
    }

    /// Spectrum produced by the last cycle.
    pub fn spectrum(&self) -> &[Complex<f32>] {
        &self.buffer
    }
}

/// Finds the bin with the largest positive real part in `1..=N/2`.
///
/// The DC bin is skipped and so is the upper half, which mirrors the lower
/// one for a real input. Ties keep the lowest bin.
pub fn find_peak(spectrum: &[Complex<f32>]) -> Peak {
    let mut peak = Peak { bin: 0, intensity: 0.0 };
    let nyquist = spectrum.len() / 2;
    for (bin, value) in spectrum.iter().enumerate().take(nyquist + 1).skip(1) {
        if value.re > peak.intensity {
            peak = Peak { bin, intensity: value.re };
        }
    }
    peak
}

/// Default width of one bin in Hz for a transform of `n` samples.
pub fn default_bin_width(sample_rate_hz: u32, n: usize) -> f32 {
    sample_rate_hz as f32 / n as f32
}

/// Centre frequency of `bin` in Hz.
pub fn bin_to_hz(bin: usize, bin_width_hz: f32) -> f32 {
    bin as f32 * bin_width_hz
}

/// Counts how often each bin has been the peak.
///
/// Useful to find the bin of a tone before adding it as an alert signature:
/// play the tone for a while and read the most frequent bins.
#[derive(Debug, Clone)]
pub struct PeakHistogram {
    counts: Vec<u32>,
}

impl PeakHistogram {
    pub fn new(bins: usize) -> Self {
        Self { counts: vec![0; bins] }
    }

    /// Records one occurrence of `bin`. Out-of-range bins are ignored.
    pub fn record(&mut self, bin: usize) {
        if let Some(count) = self.counts.get_mut(bin) {
            *count = count.saturating_add(1);
        }
    }

    pub fn count(&self, bin: usize) -> u32 {
        self.counts.get(bin).copied().unwrap_or(0)
    }

    /// The `k` most frequent bins at or above `from_bin`, most frequent
    /// first. Ties go to the lower bin; bins never seen are left out.
    pub fn top(&self, k: usize, from_bin: usize) -> Vec<usize> {
        let mut seen: Vec<(usize, u32)> = self
            .counts
            .iter()
            .copied()
            .enumerate()
            .skip(from_bin)
            .filter(|&(_, count)| count > 0)
            .collect();
        seen.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        seen.into_iter().take(k).map(|(bin, _)| bin).collect()
    }

    pub fn clear(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}
