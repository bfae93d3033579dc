//! Writing signals out of the session
//!
//! CSV of `(x, y)` pairs, a mono 16-bit WAV of the normalised samples, and
//! the spectrum as JSON. [`SignalStats`] summarises a sequence for the CLI.

use crate::error::{Error, Result};
use crate::spectrum::Spectrum;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Sample rate used for WAV export when none is given
pub const DEFAULT_WAV_RATE: u32 = 44_100;

/// Summary statistics of a sample sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalStats {
    pub sample_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub rms: f64,
    pub peak: f64,
    /// Sign changes between neighbouring samples, measured about the mean
    pub zero_crossings: usize,
}

impl SignalStats {
    /// `None` for an empty sequence
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let first = *samples.first()?;
        let n = samples.len() as f64;

        let (min, max) = samples
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let mean = samples.iter().sum::<f64>() / n;
        let rms = (samples.iter().map(|v| v * v).sum::<f64>() / n).sqrt();
        let peak = samples.iter().map(|v| v.abs()).fold(0.0, f64::max);

        let zero_crossings = samples
            .windows(2)
            .filter(|w| (w[0] >= mean) != (w[1] >= mean))
            .count();

        Some(Self {
            sample_count: samples.len(),
            min,
            max,
            mean,
            rms,
            peak,
            zero_crossings,
        })
    }

    pub fn print_summary(&self) {
        println!("Signal Statistics:");
        println!("  Samples:        {}", self.sample_count);
        println!("  Min:            {:.4}", self.min);
        println!("  Max:            {:.4}", self.max);
        println!("  Mean:           {:.4}", self.mean);
        println!("  RMS:            {:.4}", self.rms);
        println!("  Peak:           {:.4}", self.peak);
        println!("  Zero Crossings: {}", self.zero_crossings);
    }
}

/// Write `x,y` rows with a header line
pub fn write_csv(path: &Path, x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::InvalidInput(format!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "x,y")?;
    for (xi, yi) in x.iter().zip(y) {
        writeln!(out, "{xi},{yi}")?;
    }
    out.flush()?;
    info!("Wrote {} rows to {:?}", y.len(), path);
    Ok(())
}

/// Centre on the mean and scale the largest excursion to 1.0.
/// A constant sequence becomes silence.
pub fn normalize(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let excursion = samples
        .iter()
        .map(|v| (v - mean).abs())
        .fold(0.0, f64::max);
    if excursion == 0.0 {
        return vec![0.0; samples.len()];
    }
    samples.iter().map(|v| (v - mean) / excursion).collect()
}

/// Write a mono 16-bit WAV of the normalised samples
pub fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for sample in normalize(samples) {
        let scaled = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer.write_sample(scaled)?;
    }
    writer.finalize()?;

    info!(
        "Wrote {} samples at {} Hz to {:?}",
        samples.len(),
        sample_rate,
        path
    );
    Ok(())
}

/// Dump frequencies and magnitudes as pretty JSON
pub fn write_spectrum_json(path: &Path, spectrum: &Spectrum) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, spectrum)?;
    info!("Wrote {} spectrum bins to {:?}", spectrum.len(), path);
    Ok(())
}
