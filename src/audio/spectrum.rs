// Magnitude spectrum front-end.
//
// Turns a mono f32 sample buffer into a normalized magnitude spectrum:
// 1. Apply a Hanning window over the whole buffer
// 2. FFT (rustfft) to get the complex spectrum
// 3. Take per-bin magnitudes up to Nyquist
// 4. Normalize by the window gain so a full-scale sine peaks at ~1.0 (0 dBFS)
//
// The normalization makes the -40 dBFS peak floor in the extractor meaningful
// regardless of buffer length or window shape.

use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// Compute a normalized magnitude spectrum from mono samples.
///
/// Returns one magnitude per frequency bin from DC up to (but excluding)
/// Nyquist, i.e. `samples.len() / 2` bins with bin width
/// `sample_rate / samples.len()`. Buffers shorter than 2 samples yield an
/// empty spectrum.
pub fn magnitude_spectrum(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    if n < 2 {
        return Vec::new();
    }

    let window: Vec<f32> = (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (n - 1) as f32).cos()))
        .collect();
    let window_sum: f32 = window.iter().sum();

    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| Complex::new(s * w, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    // A unit-amplitude sine contributes window_sum / 2 to its bin, so
    // scaling by 2 / window_sum puts a full-scale sine at ~1.0.
    let scale = 2.0 / window_sum;
    buffer[..n / 2].iter().map(|c| c.norm() * scale).collect()
}
