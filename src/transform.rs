//! Transforms applied to an existing sample sequence
//!
//! Noise injection mutates in place; the two moving-average smoothers return
//! a new sequence. Which smoother applies depends on the active signal family:
//! generated and synthesized signals use [`moving_average_full`], the ECG trace
//! uses [`causal_moving_average`].

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Standard deviation of the noise added to the ECG trace.
///
/// Fixed and independent of the configured noise scale.
pub const ECG_NOISE_SIGMA: f64 = 10.0;

/// Add zero-mean Gaussian noise with standard deviation `sigma` to every sample.
///
/// A non-positive or non-finite `sigma` leaves the samples untouched.
pub fn add_noise<R: Rng + ?Sized>(samples: &mut [f64], sigma: f64, rng: &mut R) {
    if !(sigma > 0.0 && sigma.is_finite()) {
        return;
    }
    let Ok(normal) = Normal::new(0.0, sigma) else {
        return;
    };
    for sample in samples.iter_mut() {
        *sample += normal.sample(rng);
    }
    debug!("Added N(0, {}) noise to {} samples", sigma, samples.len());
}

/// Moving average by full convolution with a uniform kernel, truncated.
///
/// Computes `convolve(samples, ones(size)) / size` (length `n + size - 1`)
/// and keeps the first `n` values. The head therefore ramps up from a
/// partially filled window and the last `size - 1` convolution outputs are
/// discarded. This is the smoother used for generated signals.
pub fn moving_average_full(samples: &[f64], size: usize) -> Vec<f64> {
    if size == 0 {
        return samples.to_vec();
    }
    let n = samples.len();
    let scale = 1.0 / size as f64;

    let mut full = vec![0.0; n + size - 1];
    for (i, &value) in samples.iter().enumerate() {
        for out in &mut full[i..i + size] {
            *out += value;
        }
    }

    full.truncate(n);
    for value in full.iter_mut() {
        *value *= scale;
    }
    full
}

/// Causal moving average over `samples[max(0, i - size + 1) ..= i]`.
///
/// The window is shorter near the start and full afterwards, and the output
/// has exactly the input's length. This is the smoother used for the ECG trace.
pub fn causal_moving_average(samples: &[f64], size: usize) -> Vec<f64> {
    if size == 0 {
        return samples.to_vec();
    }
    let mut output = Vec::with_capacity(samples.len());
    let mut sum = 0.0;

    for (i, &value) in samples.iter().enumerate() {
        sum += value;
        if i >= size {
            sum -= samples[i - size];
        }
        let window = (i + 1).min(size);
        output.push(sum / window as f64);
    }

    output
}
