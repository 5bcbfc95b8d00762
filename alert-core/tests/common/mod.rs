use alert_core::fft::widen;
use num_traits::AsPrimitive;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Reference transform computed by rustfft in double precision.
/// Neither direction is normalised, matching the kernel.
pub fn reference_dft<T: AsPrimitive<f64>>(input: &[Complex<T>], inverse: bool) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = input.iter().map(|&c| widen(c)).collect();
    let mut planner = FftPlanner::<f64>::new();
    let fft = if inverse {
        planner.plan_fft_inverse(buffer.len())
    } else {
        planner.plan_fft_forward(buffer.len())
    };
    fft.process(&mut buffer);
    buffer
}

/// Deterministic pseudo-random test signal (xorshift), values in [-1, 1).
pub fn noise(n: usize, seed: u64) -> Vec<Complex<f32>> {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    };
    (0..n)
        .map(|_| Complex::new(next() as f32, next() as f32))
        .collect()
}

pub fn max_error<T: AsPrimitive<f64>>(actual: &[Complex<T>], expected: &[Complex<f64>]) -> f64 {
    actual
        .iter()
        .zip(expected)
        .map(|(&a, b)| (widen(a) - b).norm())
        .fold(0.0, f64::max)
}
