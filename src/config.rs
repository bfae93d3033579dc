//! Session configuration
//!
//! Every section has a `Default` matching the stock tool, and every field is
//! optional in the TOML file.
//!
//! ```toml
//! [signal]
//! period = 2.0
//!
//! [transform]
//! noise_scale = 0.2
//! filter_size = 9
//!
//! [ecg]
//! trace_dir = "/srv/traces"
//! ```

use crate::ecg::MAX_TRACE_SAMPLES;
use crate::error::{Error, Result};
use crate::transform::ECG_NOISE_SIGMA;
use crate::waveform::{Waveform, WaveformSpec, DEFAULT_CYCLES, DEFAULT_SAMPLES};
use crate::zoom::{ViewBounds, ECG_WINDOW, ZOOM_STEP};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name looked up in the user config directory
pub const CONFIG_FILE_NAME: &str = "wavescope.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub waveform: Waveform,
    pub amplitude: f64,
    pub baseline: f64,
    pub period: f64,
    pub phase: f64,
    /// Points in the shared domain
    pub samples: usize,
    /// Periods covered by the domain
    pub cycles: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            amplitude: 1.0,
            baseline: 0.0,
            period: 1.0,
            phase: 0.0,
            samples: DEFAULT_SAMPLES,
            cycles: DEFAULT_CYCLES,
        }
    }
}

impl SignalConfig {
    pub fn spec(&self) -> Result<WaveformSpec> {
        WaveformSpec::new(
            self.waveform,
            self.period,
            self.amplitude,
            self.baseline,
            self.phase,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Noise standard deviation for generated and synthesized signals
    pub noise_scale: f64,
    /// Noise standard deviation for the ECG trace
    pub ecg_noise_sigma: f64,
    /// Moving-average window length
    pub filter_size: usize,
    pub apply_filter: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            noise_scale: 0.1,
            ecg_noise_sigma: ECG_NOISE_SIGMA,
            filter_size: 5,
            apply_filter: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Phase decrement per tick for generated signals
    pub phase_step: f64,
    /// Samples rotated per tick for the ECG trace
    pub ecg_shift: usize,
    pub tick_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            phase_step: 0.05,
            ecg_shift: 15,
            tick_interval_ms: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub step: f64,
    pub ecg_x: [f64; 2],
    pub ecg_y: [f64; 2],
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            step: ZOOM_STEP,
            ecg_x: [ECG_WINDOW.x_min, ECG_WINDOW.x_max],
            ecg_y: [ECG_WINDOW.y_min, ECG_WINDOW.y_max],
        }
    }
}

impl ZoomConfig {
    pub fn ecg_window(&self) -> ViewBounds {
        ViewBounds::new(self.ecg_x[0], self.ecg_x[1], self.ecg_y[0], self.ecg_y[1])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcgConfig {
    pub trace_dir: PathBuf,
    pub max_samples: usize,
    /// Initial heart-rate slider position (0 = none selected)
    pub position: u8,
}

impl Default for EcgConfig {
    fn default() -> Self {
        Self {
            trace_dir: PathBuf::from("data"),
            max_samples: MAX_TRACE_SAMPLES,
            position: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Maximum distance along each axis between click and sample
    pub tolerance: f64,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self { tolerance: 0.5 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub signal: SignalConfig,
    pub transform: TransformConfig,
    pub animation: AnimationConfig,
    pub zoom: ZoomConfig,
    pub ecg: EcgConfig,
    pub inspect: InspectConfig,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from the user config file if present, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => {
                    debug!("No config file; using defaults");
                    return Ok(Self::default());
                }
            },
        };
        info!("Loading config from {:?}", path);
        let text = fs::read_to_string(&path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.signal.spec()?;
        if self.signal.samples == 0 {
            return Err(invalid("samples", self.signal.samples, "must be at least 1"));
        }
        if !(self.signal.cycles > 0.0 && self.signal.cycles.is_finite()) {
            return Err(invalid("cycles", self.signal.cycles, "must be positive"));
        }
        if self.transform.filter_size == 0 {
            return Err(invalid(
                "filter_size",
                self.transform.filter_size,
                "must be at least 1",
            ));
        }
        if !(self.zoom.step > 0.0 && self.zoom.step.is_finite()) {
            return Err(invalid("zoom step", self.zoom.step, "must be positive"));
        }
        if self.inspect.tolerance < 0.0 {
            return Err(invalid(
                "tolerance",
                self.inspect.tolerance,
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// `<config dir>/wavescope.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> Error {
    Error::InvalidParameter {
        field,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transform.noise_scale, 0.1);
        assert_eq!(config.transform.filter_size, 5);
        assert_eq!(config.animation.ecg_shift, 15);
        assert_eq!(config.ecg.max_samples, 2000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
[signal]
period = 2.5
waveform = "square"

[transform]
filter_size = 9
"#,
        )
        .unwrap();
        assert_eq!(config.signal.period, 2.5);
        assert_eq!(config.signal.waveform, Waveform::Square);
        assert_eq!(config.signal.amplitude, 1.0);
        assert_eq!(config.transform.filter_size, 9);
        assert_eq!(config.transform.noise_scale, 0.1);
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = Config::from_toml("[signal]\nperiod = 0.0\n");
        assert!(matches!(
            result,
            Err(Error::InvalidParameter { field: "period", .. })
        ));
    }

    #[test]
    fn test_zero_filter_size_rejected() {
        assert!(Config::from_toml("[transform]\nfilter_size = 0\n").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Config::from_toml("[signal\nperiod = 1"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_ecg_window_from_config() {
        let config = ZoomConfig::default();
        assert_eq!(config.ecg_window(), ECG_WINDOW);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
