//! Error and warning types
//!
//! Errors abort the operation that raised them and leave the session as it
//! was. Warnings are reported to the user but the operation still completes
//! (with an empty or partial result).

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for wavescope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or transforming a signal
#[derive(Error, Debug)]
pub enum Error {
    /// A user-supplied parameter was not a number, or was a zero period
    #[error("invalid {field} '{value}': {reason}")]
    InvalidParameter {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// An operation was given input it cannot work with (e.g. an empty sequence)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reading a trace or writing an export failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file did not parse
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// WAV export failed
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// JSON export failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_number(field: &'static str, value: &str) -> Self {
        Error::InvalidParameter {
            field,
            value: value.to_string(),
            reason: "enter a valid number",
        }
    }

    pub(crate) fn zero_period(value: &str) -> Self {
        Error::InvalidParameter {
            field: "period",
            value: value.to_string(),
            reason: "enter a non-zero valid number",
        }
    }

    /// Message shown to the user when a parameter edit is rejected
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidParameter { reason, .. } => format!("Please {reason}!"),
            other => other.to_string(),
        }
    }
}

/// Non-fatal conditions reported alongside a (possibly partial) result
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// No trace file backs the selected heart rate (or none was selected)
    MissingTraceSource {
        heart_rate: Option<u16>,
        path: Option<PathBuf>,
    },
    /// A trace row did not hold an integer sample and was skipped
    SkippedTraceRow { line: usize, content: String },
    /// A composite entry failed validation and was left out of the sum
    DroppedComponent { index: usize, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingTraceSource {
                heart_rate: None, ..
            } => write!(f, "no heart rate selected; ECG trace is empty"),
            Warning::MissingTraceSource {
                heart_rate: Some(bpm),
                path,
            } => {
                write!(f, "no trace data for {bpm} bpm")?;
                if let Some(path) = path {
                    write!(f, " ({})", path.display())?;
                }
                Ok(())
            }
            Warning::SkippedTraceRow { line, content } => {
                write!(f, "skipped trace line {line}: '{content}' is not an integer")
            }
            Warning::DroppedComponent { index, reason } => {
                write!(f, "signal {} dropped: {reason}", index + 1)
            }
        }
    }
}
