//! # Window Functions Module
//!
//! Weighting profiles applied to a sample buffer around the transform.
//! A forward analysis multiplies the samples by the window before the
//! transform; an inverse synthesis divides them back out afterwards.
//!
//! ## Supported windows
//! - Rectangle (identity), Hamming, Hann, Triangle (Bartlett), Welch
//! - Nuttall, Blackman, Blackman-Nuttall, Blackman-Harris, Flat-Top
//!
//! Every profile is symmetric, so only the first half of the weights is
//! evaluated and each one is applied to the mirrored pair `{i, N-1-i}`.

use num_traits::{AsPrimitive, Float};
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::fft::{TransformDirection, narrow, widen};

/// Selects one of the ten weighting profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowKind {
    /// No attenuation.
    Rectangle,
    #[default]
    Hamming,
    Hann,
    /// Bartlett window.
    Triangle,
    Nuttall,
    Blackman,
    BlackmanNuttall,
    BlackmanHarris,
    FlatTop,
    Welch,
}

impl WindowKind {
    /// All window kinds, in declaration order.
    pub const ALL: [WindowKind; 10] = [
        WindowKind::Rectangle,
        WindowKind::Hamming,
        WindowKind::Hann,
        WindowKind::Triangle,
        WindowKind::Nuttall,
        WindowKind::Blackman,
        WindowKind::BlackmanNuttall,
        WindowKind::BlackmanHarris,
        WindowKind::FlatTop,
        WindowKind::Welch,
    ];
}

/// Returns the weighting factor of `kind` for sample offset `i` in a
/// buffer of length `n`.
///
/// `i` is the distance from either end of the buffer, so the same factor
/// applies to index `i` and to index `n - 1 - i`. Callers only need
/// `i` in `[0, n / 2)`, although the formulas are valid over `[0, n)`.
///
/// # Arguments
/// * `kind` - Window profile
/// * `i` - Sample offset
/// * `n` - Transform length (the buffer length, not its log2)
pub fn weight(kind: WindowKind, i: usize, n: usize) -> f64 {
    let span = (n as f64) - 1.0;
    let ratio = i as f64 / span;
    let half_span = span / 2.0;
    let cos_k = |k: f64| (k * PI * ratio).cos();

    match kind {
        WindowKind::Rectangle => 1.0,
        WindowKind::Hamming => 0.54 - 0.46 * cos_k(2.0),
        WindowKind::Hann => 0.54 * (1.0 - cos_k(2.0)),
        WindowKind::Triangle => 1.0 - (2.0 * (i as f64 - half_span).abs()) / span,
        WindowKind::Nuttall => {
            0.355768 - 0.487396 * cos_k(2.0) + 0.144232 * cos_k(4.0) - 0.012604 * cos_k(6.0)
        }
        WindowKind::Blackman => 0.42323 - 0.49755 * cos_k(2.0) + 0.07922 * cos_k(4.0),
        WindowKind::BlackmanNuttall => {
            0.3635819 - 0.4891775 * cos_k(2.0) + 0.1365995 * cos_k(4.0) - 0.0106411 * cos_k(6.0)
        }
        WindowKind::BlackmanHarris => {
            0.35875 - 0.48829 * cos_k(2.0) + 0.14128 * cos_k(4.0) - 0.01168 * cos_k(6.0)
        }
        WindowKind::FlatTop => 0.2810639 - 0.5208972 * cos_k(2.0) + 0.1980399 * cos_k(4.0),
        WindowKind::Welch => {
            let x = (i as f64 - half_span) / half_span;
            1.0 - x * x
        }
    }
}

/// Applies the window `kind` to `buffer` in place.
///
/// A `Forward` direction multiplies each mirrored pair by its weight; an
/// `Inverse` direction divides by it, undoing a previous forward pass.
///
/// The division is not guarded. Windows whose edge weight is zero
/// (Hann, Triangle, Nuttall, Welch) turn the edge samples into
/// infinities or NaN on an inverse pass; callers that synthesize with
/// those windows must discard or repair the edges themselves.
///
/// # Arguments
/// * `buffer` - Samples to weight, length `2^log2_n` (modified in-place)
/// * `log2_n` - Base-2 logarithm of the buffer length
/// * `kind` - Window profile
/// * `direction` - Whether to multiply (forward) or divide (inverse)
pub fn apply_window<T>(
    buffer: &mut [Complex<T>],
    log2_n: u32,
    kind: WindowKind,
    direction: TransformDirection,
) where
    T: Float + AsPrimitive<f64>,
    f64: AsPrimitive<T>,
{
    let n = 1usize << log2_n;
    debug_assert_eq!(buffer.len(), n, "buffer length must be 2^log2_n");

    for i in 0..n / 2 {
        let w = weight(kind, i, n);
        for index in [i, n - 1 - i] {
            let sample = widen(buffer[index]);
            let scaled = match direction {
                TransformDirection::Forward => sample * w,
                TransformDirection::Inverse => sample / w,
            };
            buffer[index] = narrow(scaled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn rectangle_is_identity() {
        for i in 0..512 {
            assert_eq!(weight(WindowKind::Rectangle, i, 1024), 1.0);
        }
    }

    #[test]
    fn known_edge_and_center_values() {
        let n = 9; // odd length puts an exact sample on the center
        assert!((weight(WindowKind::Hamming, 0, n) - 0.08).abs() < EPS);
        assert!((weight(WindowKind::Hamming, 4, n) - 1.0).abs() < EPS);
        assert!(weight(WindowKind::Hann, 0, n).abs() < EPS);
        assert!((weight(WindowKind::Hann, 4, n) - 1.08).abs() < EPS);
        assert!(weight(WindowKind::Triangle, 0, n).abs() < EPS);
        assert!((weight(WindowKind::Triangle, 4, n) - 1.0).abs() < EPS);
        assert!(weight(WindowKind::Welch, 0, n).abs() < EPS);
        assert!((weight(WindowKind::Welch, 4, n) - 1.0).abs() < EPS);
        assert!(weight(WindowKind::Nuttall, 0, n).abs() < 1e-6);
        assert!((weight(WindowKind::Blackman, 0, n) - 0.0049).abs() < 1e-6);
        assert!((weight(WindowKind::FlatTop, 4, n) - 1.000001).abs() < 1e-6);
    }

    #[test]
    fn every_window_is_symmetric() {
        for &kind in WindowKind::ALL.iter() {
            for n in [2usize, 8, 64, 1024] {
                for i in 0..n {
                    let a = weight(kind, i, n);
                    let b = weight(kind, n - 1 - i, n);
                    assert!((a - b).abs() < 1e-9, "{kind:?} n={n} i={i}: {a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn forward_window_weights_mirrored_pairs() {
        let mut buffer = vec![Complex::new(1.0f32, 2.0); 8];
        apply_window(&mut buffer, 3, WindowKind::Hamming, TransformDirection::Forward);

        for i in 0..4 {
            let w = weight(WindowKind::Hamming, i, 8) as f32;
            assert!((buffer[i].re - w).abs() < 1e-6);
            assert!((buffer[i].im - 2.0 * w).abs() < 1e-6);
            assert_eq!(buffer[i], buffer[7 - i]);
        }
    }

    #[test]
    fn inverse_window_undoes_forward_window() {
        let original: Vec<Complex<f64>> = (0..16)
            .map(|i| Complex::new(i as f64 - 7.5, (i as f64 * 0.3).sin()))
            .collect();
        let mut buffer = original.clone();

        apply_window(&mut buffer, 4, WindowKind::Blackman, TransformDirection::Forward);
        apply_window(&mut buffer, 4, WindowKind::Blackman, TransformDirection::Inverse);

        for (a, b) in buffer.iter().zip(&original) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn inverse_window_with_zero_edge_is_not_finite() {
        let mut buffer = vec![Complex::new(1.0f32, 0.0); 8];
        apply_window(&mut buffer, 3, WindowKind::Hann, TransformDirection::Inverse);

        assert!(!buffer[0].re.is_finite());
        assert!(!buffer[7].re.is_finite());
        assert!(buffer[3].re.is_finite());
    }

    #[test]
    fn window_kind_uses_kebab_case_names() {
        let json = serde_json::to_string(&WindowKind::BlackmanHarris).unwrap();
        assert_eq!(json, "\"blackman-harris\"");
        let kind: WindowKind = serde_json::from_str("\"flat-top\"").unwrap();
        assert_eq!(kind, WindowKind::FlatTop);
    }
}
