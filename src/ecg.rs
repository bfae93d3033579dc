//! ECG trace loading and playback
//!
//! Prerecorded traces live one per heart rate in `<trace_dir>/bpm<N>.csv`,
//! one integer sample per row (first column). Traces are capped at
//! [`MAX_TRACE_SAMPLES`] rows and cached after the first successful load.
//!
//! # Example
//!
//! ```no_run
//! use wavescope::ecg::{EcgPlayer, HeartRate};
//!
//! let mut player = EcgPlayer::new("data");
//! let load = player.load(HeartRate::from_position(2));
//! for warning in &load.warnings {
//!     eprintln!("{warning}");
//! }
//! println!("{} samples at 60 bpm", load.samples.len());
//! ```

use crate::error::Warning;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Maximum rows read from a trace file
pub const MAX_TRACE_SAMPLES: usize = 2000;

/// Heart rates with a recorded trace, in slider order (positions 1..=7)
pub const HEART_RATES: [u16; 7] = [30, 60, 80, 90, 120, 150, 300];

/// Highest slider position
pub const MAX_POSITION: u8 = HEART_RATES.len() as u8;

/// One of the enumerated heart rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeartRate(u16);

impl HeartRate {
    /// Accept only rates that have a recorded trace
    pub fn new(bpm: u16) -> Option<Self> {
        HEART_RATES.contains(&bpm).then_some(Self(bpm))
    }

    /// Slider position to heart rate. Position 0 has no mapping.
    pub fn from_position(position: u8) -> Option<Self> {
        match position {
            1..=MAX_POSITION => Some(Self(HEART_RATES[position as usize - 1])),
            _ => None,
        }
    }

    pub fn bpm(self) -> u16 {
        self.0
    }

    pub fn file_name(self) -> String {
        format!("bpm{}.csv", self.0)
    }
}

/// Result of loading a trace: possibly empty samples plus any warnings
#[derive(Debug, Clone, Default)]
pub struct TraceLoad {
    pub samples: Vec<i32>,
    pub warnings: Vec<Warning>,
}

/// Loads traces from a directory and caches them by heart rate
pub struct EcgPlayer {
    trace_dir: PathBuf,
    max_samples: usize,
    traces: HashMap<HeartRate, Vec<i32>>,
}

impl EcgPlayer {
    pub fn new(trace_dir: impl Into<PathBuf>) -> Self {
        Self::with_limit(trace_dir, MAX_TRACE_SAMPLES)
    }

    pub fn with_limit(trace_dir: impl Into<PathBuf>, max_samples: usize) -> Self {
        Self {
            trace_dir: trace_dir.into(),
            max_samples,
            traces: HashMap::new(),
        }
    }

    pub fn trace_dir(&self) -> &Path {
        &self.trace_dir
    }

    pub fn trace_path(&self, heart_rate: HeartRate) -> PathBuf {
        self.trace_dir.join(heart_rate.file_name())
    }

    /// Load the trace for `heart_rate`.
    ///
    /// No selection or a missing file gives an empty trace and a
    /// [`Warning::MissingTraceSource`]; never an error.
    pub fn load(&mut self, heart_rate: Option<HeartRate>) -> TraceLoad {
        let Some(heart_rate) = heart_rate else {
            warn!("No heart rate selected");
            return TraceLoad {
                samples: Vec::new(),
                warnings: vec![Warning::MissingTraceSource {
                    heart_rate: None,
                    path: None,
                }],
            };
        };

        if let Some(samples) = self.traces.get(&heart_rate) {
            debug!("Trace cache hit for {} bpm", heart_rate.bpm());
            return TraceLoad {
                samples: samples.clone(),
                warnings: Vec::new(),
            };
        }

        let path = self.trace_path(heart_rate);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Cannot open trace {}: {}", path.display(), e);
                return TraceLoad {
                    samples: Vec::new(),
                    warnings: vec![Warning::MissingTraceSource {
                        heart_rate: Some(heart_rate.bpm()),
                        path: Some(path),
                    }],
                };
            }
        };

        let load = read_trace(BufReader::new(file), self.max_samples);
        info!(
            "Loaded {} ECG samples at {} bpm from {:?}",
            load.samples.len(),
            heart_rate.bpm(),
            path
        );
        self.traces.insert(heart_rate, load.samples.clone());
        load
    }
}

/// Parse up to `max_samples` integer rows, taking the first CSV column.
///
/// Blank rows are ignored; rows that do not parse are skipped with a warning.
/// A read error ends the trace early.
pub fn read_trace<R: BufRead>(reader: R, max_samples: usize) -> TraceLoad {
    let mut load = TraceLoad::default();

    for (index, line) in reader.lines().enumerate() {
        if load.samples.len() >= max_samples {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Trace read stopped at line {}: {}", index + 1, e);
                break;
            }
        };
        let field = line.split(',').next().unwrap_or("").trim();
        if field.is_empty() {
            continue;
        }
        match field.parse::<i32>() {
            Ok(value) => load.samples.push(value),
            Err(_) => {
                warn!("Skipping trace line {}: {:?}", index + 1, field);
                load.warnings.push(Warning::SkippedTraceRow {
                    line: index + 1,
                    content: field.to_string(),
                });
            }
        }
    }

    load
}

/// Circular left-rotate by `shift` samples (taken modulo the length).
///
/// The front block moves to the back, scrolling the trace. Empty buffers are
/// left untouched.
pub fn step<T>(buffer: &mut [T], shift: usize) {
    if buffer.is_empty() {
        return;
    }
    let shift = shift % buffer.len();
    buffer.rotate_left(shift);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_positions_map_to_heart_rates() {
        assert_eq!(HeartRate::from_position(0), None);
        assert_eq!(HeartRate::from_position(1).map(HeartRate::bpm), Some(30));
        assert_eq!(HeartRate::from_position(7).map(HeartRate::bpm), Some(300));
        assert_eq!(HeartRate::from_position(8), None);
    }

    #[test]
    fn test_heart_rate_new_rejects_unknown() {
        assert!(HeartRate::new(60).is_some());
        assert!(HeartRate::new(61).is_none());
        assert_eq!(HeartRate::new(120).unwrap().file_name(), "bpm120.csv");
    }

    #[test]
    fn test_read_trace_first_column() {
        let data = "2150,foo\n2160\n\n2170, 3\n";
        let load = read_trace(Cursor::new(data), 10);
        assert_eq!(load.samples, vec![2150, 2160, 2170]);
        assert!(load.warnings.is_empty());
    }

    #[test]
    fn test_read_trace_caps_length() {
        let data: String = (0..50).map(|i| format!("{i}\n")).collect();
        let load = read_trace(Cursor::new(data), 20);
        assert_eq!(load.samples.len(), 20);
        assert_eq!(load.samples[19], 19);
    }

    #[test]
    fn test_read_trace_skips_bad_rows() {
        let data = "1\nabc\n3\n";
        let load = read_trace(Cursor::new(data), 10);
        assert_eq!(load.samples, vec![1, 3]);
        assert_eq!(
            load.warnings,
            vec![Warning::SkippedTraceRow {
                line: 2,
                content: "abc".to_string()
            }]
        );
    }

    #[test]
    fn test_step_rotates_left() {
        let mut buffer = vec![1, 2, 3, 4, 5];
        step(&mut buffer, 2);
        assert_eq!(buffer, vec![3, 4, 5, 1, 2]);
    }

    #[test]
    fn test_step_wraps_large_shift() {
        let mut buffer = vec![1, 2, 3, 4, 5];
        step(&mut buffer, 12);
        assert_eq!(buffer, vec![3, 4, 5, 1, 2]);
    }

    #[test]
    fn test_step_inverse_restores_order() {
        let original: Vec<i32> = (0..40).collect();
        let mut buffer = original.clone();
        step(&mut buffer, 15);
        step(&mut buffer, original.len() - 15);
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_step_empty_buffer() {
        let mut buffer: Vec<f64> = Vec::new();
        step(&mut buffer, 15);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_load_without_selection_warns() {
        let mut player = EcgPlayer::new("does-not-exist");
        let load = player.load(None);
        assert!(load.samples.is_empty());
        assert_eq!(
            load.warnings,
            vec![Warning::MissingTraceSource {
                heart_rate: None,
                path: None
            }]
        );
    }

    #[test]
    fn test_load_missing_file_warns() {
        let mut player = EcgPlayer::new("does-not-exist");
        let load = player.load(HeartRate::new(90));
        assert!(load.samples.is_empty());
        assert!(matches!(
            load.warnings.as_slice(),
            [Warning::MissingTraceSource {
                heart_rate: Some(90),
                ..
            }]
        ));
    }
}
