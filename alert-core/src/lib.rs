// alert-core/src/lib.rs

//! The core logic for the sound alert listener.
//! This crate is responsible for audio capture, the Fourier transform and
//! its windowing, and matching the resulting spectra against known alert
//! tones. It is completely headless and contains no rendering code.

pub mod alerts;
pub mod analysis;
pub mod audio;
pub mod config;
pub mod fft;
pub mod visual;
pub mod window;

pub use alerts::{AlertMatch, AlertSignature, AlertTable};
pub use analysis::{Analyzer, Peak, PeakHistogram, find_peak};
pub use config::ListenConfig;
pub use fft::{TransformDirection, perform_transform};
pub use window::{WindowKind, apply_window};

/// Summary of one analysed frame, as reported by the listen loop.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Strongest bin of the frame.
    pub peak: Peak,
    /// Frequency of that bin in Hz.
    pub peak_hz: f32,
    /// Alert triggered by this frame, if any.
    pub alert: Option<AlertMatch>,
}

/// Analyses `frame`, locates its peak and checks it against `alerts`.
pub fn process_frame(
    analyzer: &mut Analyzer,
    alerts: &mut AlertTable,
    frame: &[f32],
    config: &ListenConfig,
) -> AnalysisResult {
    let spectrum = analyzer.analyze(frame, config.input_gain);
    let peak = find_peak(spectrum);
    let alert = alerts.evaluate(&peak);
    AnalysisResult {
        peak,
        peak_hz: analysis::bin_to_hz(peak.bin, config.bin_width()),
        alert,
    }
}
