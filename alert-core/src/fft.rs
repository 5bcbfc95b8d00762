//! # Fast Fourier Transform (FFT) Module
//!
//! In-place iterative radix-2 Cooley-Tukey transform over a caller-owned
//! buffer of `2^log2_n` complex samples.
//!
//! ## Pipeline
//! 1. [`rearrange`]: bit-reversal permutation of the buffer
//! 2. [`evaluate`]: butterfly network, one stage per bit of the length
//! 3. [`perform_transform`]: both of the above, then the DC bin is zeroed
//!
//! Windowing lives in [`crate::window`] and is applied by the caller before
//! a forward analysis or after an inverse synthesis.
//!
//! The buffer length must equal `2^log2_n`. This is only checked in debug
//! builds; a mismatched length yields meaningless output or an index panic.

use num_traits::{AsPrimitive, Float};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

// Twiddle factors, window weights and butterfly intermediates are always
// evaluated in f64. Buffer elements are widened on load and narrowed on store.

/// Loads a buffer element at `f64` working precision.
pub fn widen<T: AsPrimitive<f64>>(value: Complex<T>) -> Complex<f64> {
    Complex::new(value.re.as_(), value.im.as_())
}

/// Stores an `f64` intermediate at the buffer's own precision.
pub fn narrow<T>(value: Complex<f64>) -> Complex<T>
where
    T: Copy + 'static,
    f64: AsPrimitive<T>,
{
    Complex::new(value.re.as_(), value.im.as_())
}

/// Direction of the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformDirection {
    /// Analysis, time to frequency. Rotates by `-2π`.
    Forward,
    /// Synthesis, frequency to time. Rotates by `+2π` and is not scaled.
    Inverse,
}

impl TransformDirection {
    /// Full-turn rotation angle for this direction.
    fn full_turn(self) -> f64 {
        match self {
            TransformDirection::Forward => -2.0 * PI,
            TransformDirection::Inverse => 2.0 * PI,
        }
    }
}

/// Reverses the low `bits` bits of `index`.
pub fn reverse_bits(index: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    index.reverse_bits() >> (usize::BITS - bits)
}

/// Reorders `buffer` so that `buffer[k]` ends up holding the sample that was
/// at `reverse_bits(k, log2_n)`.
///
/// The reversed counter `j` is advanced without recomputing it: flipping
/// every bit from the mirror of the lowest zero bit of `i` downwards turns
/// `rev(i)` into `rev(i + 1)`. Each pair is swapped once, when `j > i`.
pub fn rearrange<T>(buffer: &mut [T], log2_n: u32) {
    let n = 1usize << log2_n;
    debug_assert_eq!(buffer.len(), n, "buffer length must be 2^log2_n");
    let half = n >> 1;
    let mask = n - 1;

    let mut j = 0usize;
    for i in 0..n {
        if j > i {
            buffer.swap(i, j);
        }
        let lowest_zero = !i & (i + 1);
        let mirrored = half / lowest_zero;
        j ^= mask & !mirrored.wrapping_sub(1);
    }
}

/// Runs the butterfly network over a bit-reversed `buffer`.
///
/// For each stage `r` in `1..=log2_n` with block size `m = 2^r`, the stage
/// root `wm = e^(iθ/m)` is computed once and the running twiddle `wmk`
/// is built by repeated multiplication, restarting at 1 for every block.
/// The inverse direction is not normalised; a forward/inverse round trip
/// scales the signal by `N`.
pub fn evaluate<T>(buffer: &mut [Complex<T>], log2_n: u32, direction: TransformDirection)
where
    T: Float + AsPrimitive<f64>,
    f64: AsPrimitive<T>,
{
    let n = 1usize << log2_n;
    debug_assert_eq!(buffer.len(), n, "buffer length must be 2^log2_n");
    let full_turn = direction.full_turn();

    for r in 1..=log2_n {
        let m = 1usize << r;
        let half = m >> 1;
        let theta = full_turn / m as f64;
        let wm = Complex::new(theta.cos(), theta.sin());

        for block in (0..n).step_by(m) {
            let mut wmk = Complex::new(1.0f64, 0.0);
            for k in 0..half {
                let even = block + k;
                let odd = even + half;
                let t = wmk * widen(buffer[odd]);
                let e = widen(buffer[even]);
                buffer[odd] = narrow(e - t);
                buffer[even] = narrow(e + t);
                wmk *= wm;
            }
        }
    }
}

/// Computes the transform of `buffer` in place and discards the DC bin.
///
/// `buffer[0]` is always set to zero afterwards: 0 Hz carries no meaning
/// for frequency matching, and on this hardware it mostly reflects the
/// microphone bias.
pub fn perform_transform<T>(buffer: &mut [Complex<T>], log2_n: u32, direction: TransformDirection)
where
    T: Float + AsPrimitive<f64>,
    f64: AsPrimitive<T>,
{
    rearrange(buffer, log2_n);
    evaluate(buffer, log2_n, direction);
    if let Some(dc) = buffer.first_mut() {
        *dc = Complex::new(T::zero(), T::zero());
    }
}
