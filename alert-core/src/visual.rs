//! # Visualization Data Module
//!
//! Reduces spectra and raw samples to the small integer grids the
//! diagnostic views draw: bar heights with their peak-hold markers,
//! spectrogram colour levels and an amplitude envelope. Nothing here
//! draws; renderers consume the numbers.

use rustfft::num_complex::Complex;

/// Linearly rescales `x` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Integer arithmetic, truncating toward zero, and no clamping: values
/// outside the input range map outside the output range. Results beyond
/// the `i64` range saturate.
pub fn map_range(x: i64, in_min: i64, in_max: i64, out_min: i64, out_max: i64) -> i64 {
    if in_max == in_min {
        return out_min;
    }
    let [x, in_min, in_max, out_min, out_max] =
        [x, in_min, in_max, out_min, out_max].map(i128::from);
    let scaled = ((x - in_min).saturating_mul(out_max - out_min) / (in_max - in_min))
        .saturating_add(out_min);
    scaled.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Heights of `bars` spectrum bars.
///
/// Bar `b` covers bins `first_bin + b * bins_per_bar ..` and takes the
/// largest real part among them, mapped from `[0, full_scale]` onto
/// `[0, height]` and clamped to that range. Bins past the end of the
/// spectrum count as silent.
pub fn spectrum_bars(
    spectrum: &[Complex<f32>],
    bars: usize,
    bins_per_bar: usize,
    first_bin: usize,
    full_scale: i64,
    height: i64,
) -> Vec<i64> {
    (0..bars)
        .map(|bar| {
            let start = first_bin + bar * bins_per_bar;
            (start..start + bins_per_bar)
                .filter_map(|bin| spectrum.get(bin))
                .map(|value| map_range(value.re as i64, 0, full_scale, 0, height))
                .fold(0, i64::max)
                .clamp(0, height)
        })
        .collect()
}

/// Colour levels for one spectrogram column.
///
/// Row `r` reads bin `first_bin + r` and maps `|re|` from `[0, full_scale]`
/// onto `[0, levels - 1]`, clamped. Row 0 is the lowest frequency.
pub fn spectrogram_column(
    spectrum: &[Complex<f32>],
    rows: usize,
    first_bin: usize,
    full_scale: i64,
    levels: u8,
) -> Vec<u8> {
    let top = i64::from(levels.saturating_sub(1));
    (0..rows)
        .map(|row| {
            let amplitude = spectrum
                .get(first_bin + row)
                .map_or(0, |value| value.re.abs() as i64);
            map_range(amplitude, 0, full_scale, 0, top).clamp(0, top) as u8
        })
        .collect()
}

/// Peak-hold markers for a bar spectrum.
///
/// Each marker jumps up to its bar and then falls back by one step per
/// frame, so short bursts stay visible for a while after they end.
#[derive(Debug, Clone)]
pub struct PeakHold {
    held: Vec<i64>,
    height: i64,
}

impl PeakHold {
    pub fn new(bars: usize, height: i64) -> Self {
        Self {
            held: vec![0; bars],
            height,
        }
    }

    /// Raises every marker to its bar and returns the marker heights to
    /// draw for this frame. The markers then decay by one step.
    pub fn update(&mut self, bars: &[i64]) -> Vec<i64> {
        self.held.resize(bars.len(), 0);
        let height = self.height;
        self.held
            .iter_mut()
            .zip(bars)
            .map(|(held, &bar)| {
                let level = (*held).max(bar).clamp(0, height);
                *held = (level - 1).max(0);
                level
            })
            .collect()
    }
}

/// Running amplitude envelope over short bursts of raw samples.
///
/// Each burst is reduced to its peak-to-peak swing around the silence
/// level and scaled to the display height. The smallest and largest
/// swing seen since the last reset are kept for the on-screen legend.
#[derive(Debug, Clone)]
pub struct Envelope {
    silence: i32,
    full_scale: i32,
    height: i32,
    min: Option<i32>,
    max: Option<i32>,
}

impl Envelope {
    /// `silence` is the reading of a quiet microphone, `full_scale` the
    /// largest reading, `height` the display height of the graph.
    pub fn new(silence: i32, full_scale: i32, height: i32) -> Self {
        Self {
            silence,
            full_scale,
            height,
            min: None,
            max: None,
        }
    }

    /// Adds one burst and returns its height on the graph.
    pub fn push(&mut self, burst: &[i32]) -> i32 {
        let silence = i64::from(self.silence);
        let (low, high) = burst
            .iter()
            .map(|&s| i64::from(s) - silence)
            .fold((i64::MAX, i64::MIN), |(lo, hi), s| (lo.min(s), hi.max(s)));
        let swing = if burst.is_empty() { 0 } else { high - low };

        let scaled = map_range(
            swing,
            0,
            i64::from(self.full_scale) - silence,
            0,
            i64::from(self.height),
        );
        let level = scaled.clamp(0, i64::from(self.height)) as i32;

        self.min = Some(self.min.map_or(level, |m| m.min(level)));
        self.max = Some(self.max.map_or(level, |m| m.max(level)));
        level
    }

    pub fn min(&self) -> Option<i32> {
        self.min
    }

    pub fn max(&self) -> Option<i32> {
        self.max
    }

    pub fn reset(&mut self) {
        self.min = None;
        self.max = None;
    }
}
