//! Windowing and radix-2 FFT magnitude kernel.

use realfft::num_complex::Complex;

use crate::error::{EngineError, Result};

/// Hann window coefficients: `0.5 * (1 - cos(2πi / (N-1)))`.
/// A window of length 0 or 1 is all ones.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| (0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos())) as f32)
        .collect()
}

/// Return a Hann-windowed copy of `signal`.
pub fn apply_hann_window(signal: &[f32]) -> Vec<f32> {
    apply_window(signal, &hann_window(signal.len()))
}

pub(crate) fn apply_window(signal: &[f32], window: &[f32]) -> Vec<f32> {
    signal.iter().zip(window.iter()).map(|(&s, &w)| s * w).collect()
}

/// Magnitude spectrum of a real signal whose length is a power of two.
///
/// Returns the first `N/2` bins, each `|X(i)| / N`. Bin 0 is DC.
pub fn compute_magnitude_spectrum(signal: &[f32]) -> Result<Vec<f32>> {
    let n = signal.len();
    if !n.is_power_of_two() {
        return Err(EngineError::InvalidInputSize { len: n });
    }

    let mut buf: Vec<Complex<f32>> = signal.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft_in_place(&mut buf);

    let scale = 1.0 / n as f32;
    Ok(buf[..n / 2].iter().map(|c| c.norm() * scale).collect())
}

/// In-place decimation-in-time Cooley-Tukey. `buf.len()` must be a power of two.
fn fft_in_place(buf: &mut [Complex<f32>]) {
    let n = buf.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            buf.swap(i, j);
        }
    }

    // log2(N) butterfly passes
    let mut m = 2;
    while m <= n {
        let half = m / 2;
        for j in 0..half {
            let angle = -2.0 * std::f64::consts::PI * j as f64 / m as f64;
            let w = Complex::new(angle.cos() as f32, angle.sin() as f32);
            for k in (j..n).step_by(m) {
                let t = w * buf[k + half];
                let u = buf[k];
                buf[k] = u + t;
                buf[k + half] = u - t;
            }
        }
        m *= 2;
    }
}
