//! One-sided magnitude spectrum of a real signal
//!
//! Uses realfft for the real-to-complex transform. Bin `k` of an `n`-point
//! sequence sits at `k * sample_rate / n` for `k = 0..=n/2`.

use crate::error::{Error, Result};
use num_complex::Complex;
use realfft::RealFftPlanner;
use serde::Serialize;
use tracing::debug;

/// Frequencies and magnitudes of the non-negative half of the spectrum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Bin with the largest magnitude, ignoring DC
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.frequencies
            .iter()
            .zip(&self.magnitudes)
            .skip(1)
            .fold(None, |best: Option<(f64, f64)>, (&f, &m)| match best {
                Some((_, best_m)) if best_m >= m => best,
                _ => Some((f, m)),
            })
    }
}

/// Bin centre frequencies for an `n`-point real FFT at `sample_rate`
pub fn rfft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let spacing = sample_rate / n as f64;
    (0..=n / 2).map(|k| k as f64 * spacing).collect()
}

/// Spectrum analyzer holding an FFT planner so repeated sizes reuse plans
pub struct SpectrumAnalyzer {
    planner: RealFftPlanner<f64>,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
        }
    }

    /// Compute `|rfft(samples)|` and the matching bin frequencies.
    ///
    /// Fails with [`Error::InvalidInput`] on an empty sequence or a
    /// non-positive sample rate.
    pub fn analyze(&mut self, samples: &[f64], sample_rate: f64) -> Result<Spectrum> {
        if samples.is_empty() {
            return Err(Error::InvalidInput(
                "spectrum of an empty sequence".to_string(),
            ));
        }
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }

        let n = samples.len();
        let r2c = self.planner.plan_fft_forward(n);
        let mut input = samples.to_vec();
        let mut output: Vec<Complex<f64>> = r2c.make_output_vec();
        r2c.process(&mut input, &mut output)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        let magnitudes: Vec<f64> = output.iter().map(|c| c.norm()).collect();
        let frequencies = rfft_frequencies(n, sample_rate);
        debug!("Spectrum of {} samples: {} bins", n, magnitudes.len());

        Ok(Spectrum {
            frequencies,
            magnitudes,
        })
    }
}

/// One-shot spectrum with a fresh planner
pub fn spectrum(samples: &[f64], sample_rate: f64) -> Result<Spectrum> {
    SpectrumAnalyzer::new().analyze(samples, sample_rate)
}
