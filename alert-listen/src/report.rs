//! Plain-text renderings of analysis results for the terminal.

use alert_core::visual::map_range;
use alert_core::{AlertMatch, AnalysisResult, analysis::bin_to_hz};

/// Bars drawn in `bars` mode.
pub const BAR_COUNT: usize = 16;
/// Adjacent bins folded into one bar.
pub const BINS_PER_BAR: usize = 4;
/// Bins 0 and 1 hold DC and mains hum; the bars start after them.
pub const FIRST_BAR_BIN: usize = 2;
/// Bin intensity drawn as a full bar.
pub const BAR_FULL_SCALE: i64 = 3000;
/// Bar height in character cells.
pub const BAR_HEIGHT: i64 = 8;

/// Frequency rows per spectrogram line, starting above DC.
pub const SPECTROGRAM_ROWS: usize = 64;
pub const SPECTROGRAM_FIRST_BIN: usize = 1;
/// `|re|` drawn at the strongest shade.
pub const SPECTROGRAM_FULL_SCALE: i64 = 160;

/// Reading of a quiet microphone, in ADC-like counts.
pub const ENVELOPE_SILENCE: i32 = 1450;
/// Largest reading, in ADC-like counts.
pub const ENVELOPE_FULL_SCALE: i32 = 3000;
/// Samples reduced to one envelope point.
pub const ENVELOPE_BURST: usize = 64;

const BAR_GLYPHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SHADE_GLYPHS: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Colour levels per spectrogram row, one per shade glyph.
pub const SPECTROGRAM_LEVELS: u8 = SHADE_GLYPHS.len() as u8;

pub fn alert_line(alert: &AlertMatch, bin_width_hz: f32) -> String {
    format!(
        "ALERT {} ({} Hz): bin {} at {:.0} Hz, intensity {:.0}",
        alert.name,
        alert.frequency_hz,
        alert.bin,
        bin_to_hz(alert.bin, bin_width_hz),
        alert.intensity
    )
}

/// Peak summary followed by the most frequent peak bins, if any.
pub fn info_line(result: &AnalysisResult, best: &[usize]) -> String {
    let mut line = format!(
        "bin {:>4}  {:>8.1} Hz  intensity {:>10.0}",
        result.peak.bin, result.peak_hz, result.peak.intensity
    );
    if !best.is_empty() {
        let bins: Vec<String> = best.iter().map(|b| b.to_string()).collect();
        line.push_str("  best ");
        line.push_str(&bins.join(","));
    }
    line
}

/// One block glyph per value, scaled from `0..=height`.
fn block_glyphs(values: &[i64], height: i64) -> String {
    let top = BAR_GLYPHS.len() as i64 - 1;
    values
        .iter()
        .map(|&h| BAR_GLYPHS[map_range(h, 0, height, 0, top).clamp(0, top) as usize])
        .collect()
}

/// Bars, then their peak-hold markers, both scaled from `0..=BAR_HEIGHT`.
pub fn bars_line(bars: &[i64], held: &[i64]) -> String {
    format!("{} | {}", block_glyphs(bars, BAR_HEIGHT), block_glyphs(held, BAR_HEIGHT))
}

/// One shade glyph per spectrogram row, lowest frequency first.
pub fn spectrogram_line(column: &[u8]) -> String {
    column
        .iter()
        .map(|&level| SHADE_GLYPHS[usize::from(level).min(SHADE_GLYPHS.len() - 1)])
        .collect()
}

/// Envelope points of one frame, then the extremes since start-up.
pub fn envelope_line(levels: &[i32], min: Option<i32>, max: Option<i32>, height: i32) -> String {
    let levels: Vec<i64> = levels.iter().map(|&l| i64::from(l)).collect();
    let extreme = |value: Option<i32>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "{}  min {} max {}",
        block_glyphs(&levels, i64::from(height)),
        extreme(min),
        extreme(max)
    )
}
