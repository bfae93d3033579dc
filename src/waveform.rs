//! Waveform generator
//!
//! Pure functions mapping a sampled domain and a [`WaveformSpec`] to a sample
//! sequence. Four periodic families are supported: sine, triangle, sawtooth
//! and square. All formulas evaluate at `t = x - phase`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Number of domain points generated for a period
pub const DEFAULT_SAMPLES: usize = 1000;

/// Number of fundamental periods covered by the domain
pub const DEFAULT_CYCLES: f64 = 10.0;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Sawtooth,
        Waveform::Square,
    ];

    /// Map a synthesis type code (1 = sine .. 4 = square) to a waveform
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Waveform::Sine),
            2 => Some(Waveform::Triangle),
            3 => Some(Waveform::Sawtooth),
            4 => Some(Waveform::Square),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Waveform::Sine => 1,
            Waveform::Triangle => 2,
            Waveform::Sawtooth => 3,
            Waveform::Square => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Square => "square",
        }
    }

    /// Axis label used by the plot
    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine Wave",
            Waveform::Triangle => "Triangle Wave",
            Waveform::Sawtooth => "Sawtooth Wave",
            Waveform::Square => "Square Wave",
        }
    }

    /// Evaluate the waveform at phase-shifted position `t`.
    ///
    /// `period` must be non-zero; callers validate it before getting here.
    pub fn evaluate(self, t: f64, period: f64, amplitude: f64, baseline: f64) -> f64 {
        match self {
            Waveform::Sine => amplitude * (2.0 * PI * t / period).sin() + baseline,

            Waveform::Triangle => {
                let w = wrap(t, period);
                amplitude * (w - period / 2.0).abs() + baseline
            }

            // Ramps from baseline to baseline + amplitude once per period
            Waveform::Sawtooth => baseline + amplitude * wrap(t, period) / period,

            Waveform::Square => baseline + amplitude * sign((2.0 * PI * t / period).sin()),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Waveform::from_code(code).ok_or_else(|| Error::InvalidParameter {
                field: "type",
                value: trimmed.to_string(),
                reason: "type code must be 1-4",
            });
        }
        match trimmed.to_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "square" | "sq" => Ok(Waveform::Square),
            _ => Err(Error::InvalidParameter {
                field: "type",
                value: trimmed.to_string(),
                reason: "expected sine, triangle, sawtooth or square",
            }),
        }
    }
}

/// Parameters of one periodic waveform.
///
/// Built from validated user input and replaced wholesale on edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformSpec {
    #[serde(rename = "type")]
    pub waveform: Waveform,
    pub period: f64,
    pub amplitude: f64,
    pub baseline: f64,
    pub phase: f64,
}

impl Default for WaveformSpec {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            period: 1.0,
            amplitude: 1.0,
            baseline: 0.0,
            phase: 0.0,
        }
    }
}

impl WaveformSpec {
    /// Create a spec, rejecting a zero or non-finite period
    pub fn new(
        waveform: Waveform,
        period: f64,
        amplitude: f64,
        baseline: f64,
        phase: f64,
    ) -> Result<Self> {
        let spec = Self {
            waveform,
            period,
            amplitude,
            baseline,
            phase,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if self.period == 0.0 {
            return Err(Error::zero_period(&self.period.to_string()));
        }
        let fields = [
            ("period", self.period),
            ("amplitude", self.amplitude),
            ("baseline", self.baseline),
            ("phase", self.phase),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(Error::invalid_number(field, &value.to_string()));
            }
        }
        Ok(())
    }

    /// Same spec with `offset` added to its phase
    pub fn with_phase_offset(&self, offset: f64) -> Self {
        Self {
            phase: self.phase + offset,
            ..*self
        }
    }

    /// Evaluate at a single domain point
    #[inline]
    pub fn sample(&self, x: f64) -> f64 {
        self.waveform
            .evaluate(x - self.phase, self.period, self.amplitude, self.baseline)
    }

    /// Sampling rate handed to the spectrum analyzer: ten samples per cycle.
    /// A negative period gives the same rate as its magnitude.
    pub fn spectrum_sample_rate(&self) -> f64 {
        10.0 / self.period.abs()
    }
}

/// Generate the sample sequence of `spec` over `domain`
pub fn generate(domain: &[f64], spec: &WaveformSpec) -> Vec<f64> {
    domain.iter().map(|&x| spec.sample(x)).collect()
}

/// Period-wrapped remainder with the sign of `period` (floored modulo).
///
/// For a positive period the result lies in `[0, period)`.
#[inline]
pub fn wrap(t: f64, period: f64) -> f64 {
    let r = t % period;
    if r != 0.0 && (r < 0.0) != (period < 0.0) {
        r + period
    } else {
        r
    }
}

/// Numeric sign with `sign(0) == 0`
#[inline]
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// `count` evenly spaced points from `start` to `stop`, both ends included
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// X-coordinates shared by every generated and synthesized signal.
///
/// Derived from a base period: `samples` points over `cycles` periods.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    period: f64,
    cycles: f64,
    points: Vec<f64>,
}

impl Domain {
    pub fn new(period: f64, cycles: f64, samples: usize) -> Self {
        Self {
            period,
            cycles,
            points: linspace(0.0, cycles * period, samples),
        }
    }

    /// Default domain: 1000 points over ten periods
    pub fn for_period(period: f64) -> Self {
        Self::new(period, DEFAULT_CYCLES, DEFAULT_SAMPLES)
    }

    /// Rebuild for a new base period, keeping cycle and sample counts.
    /// Returns false when the period is unchanged.
    pub fn set_period(&mut self, period: f64) -> bool {
        if period == self.period {
            return false;
        }
        *self = Self::new(period, self.cycles, self.points.len());
        true
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(waveform: Waveform, period: f64) -> WaveformSpec {
        WaveformSpec::new(waveform, period, 1.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_sine_quarter_points() {
        let domain = [0.0, 0.5, 1.0, 1.5];
        let y = generate(&domain, &spec(Waveform::Sine, 2.0));
        let expected = [0.0, 1.0, 0.0, -1.0];
        for (got, want) in y.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_triangle_extremes() {
        let s = WaveformSpec::new(Waveform::Triangle, 4.0, 2.0, 1.0, 0.0).unwrap();
        // Wrapped offset 0 -> max, period/2 -> baseline
        assert!((s.sample(0.0) - (1.0 + 2.0 * 2.0)).abs() < 1e-12);
        assert!((s.sample(2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sawtooth_ramps_once_per_period() {
        let s = WaveformSpec::new(Waveform::Sawtooth, 2.0, 3.0, 0.5, 0.0).unwrap();
        assert!((s.sample(0.0) - 0.5).abs() < 1e-12);
        assert!((s.sample(1.0) - 2.0).abs() < 1e-12);
        assert!((s.sample(1.999_999) - 3.5).abs() < 1e-5);
        assert!((s.sample(2.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_square_zero_crossing_is_baseline() {
        let s = WaveformSpec::new(Waveform::Square, 2.0, 1.0, 0.25, 0.0).unwrap();
        assert_eq!(s.sample(0.0), 0.25);
        assert_eq!(s.sample(0.5), 1.25);
        assert_eq!(s.sample(1.5), -0.75);
    }

    #[test]
    fn test_phase_shifts_right() {
        let base = spec(Waveform::Sawtooth, 1.0);
        let shifted = base.with_phase_offset(0.25);
        assert!((shifted.sample(0.5) - base.sample(0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_negative_input() {
        assert!((wrap(-0.25, 1.0) - 0.75).abs() < 1e-12);
        assert!((wrap(2.5, 1.0) - 0.5).abs() < 1e-12);
        assert!((wrap(0.5, -1.0) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = WaveformSpec::new(Waveform::Sine, 0.0, 1.0, 0.0, 0.0);
        assert!(matches!(
            result,
            Err(Error::InvalidParameter { field: "period", .. })
        ));
    }

    #[test]
    fn test_waveform_from_str() {
        assert_eq!("Sine".parse::<Waveform>().unwrap(), Waveform::Sine);
        assert_eq!("3".parse::<Waveform>().unwrap(), Waveform::Sawtooth);
        assert!("5".parse::<Waveform>().is_err());
        assert!("noise".parse::<Waveform>().is_err());
    }

    #[test]
    fn test_codes_round_trip() {
        for waveform in Waveform::ALL {
            assert_eq!(Waveform::from_code(waveform.code()), Some(waveform));
        }
    }

    #[test]
    fn test_domain_endpoints() {
        let domain = Domain::for_period(2.0);
        assert_eq!(domain.len(), DEFAULT_SAMPLES);
        assert_eq!(domain.points()[0], 0.0);
        assert_eq!(*domain.points().last().unwrap(), 20.0);
    }

    #[test]
    fn test_domain_set_period() {
        let mut domain = Domain::for_period(1.0);
        assert!(!domain.set_period(1.0));
        assert!(domain.set_period(3.0));
        assert_eq!(domain.period(), 3.0);
        assert_eq!(*domain.points().last().unwrap(), 30.0);
    }

    #[test]
    fn test_linspace_small_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
    }
}
