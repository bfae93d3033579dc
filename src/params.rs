//! Parsing of user-entered parameter text
//!
//! This is the boundary where text from edit fields becomes validated
//! numbers. Failures come back as [`Error::InvalidParameter`] carrying the
//! message shown to the user; nothing past this point re-validates.

use crate::error::{Error, Result, Warning};
use crate::synthesizer::CompositeSpec;
use crate::waveform::{Waveform, WaveformSpec};
use tracing::warn;

/// Text of the four numeric fields of a waveform editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterText {
    pub period: String,
    pub amplitude: String,
    pub baseline: String,
    pub phase: String,
}

impl ParameterText {
    pub fn new(period: &str, amplitude: &str, baseline: &str, phase: &str) -> Self {
        Self {
            period: period.to_string(),
            amplitude: amplitude.to_string(),
            baseline: baseline.to_string(),
            phase: phase.to_string(),
        }
    }
}

/// One row of the synthesis dialog
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRow {
    /// Type name or code (1-4)
    pub kind: String,
    pub fields: ParameterText,
}

/// Parse a finite number, tolerating surrounding whitespace
pub fn parse_number(field: &'static str, text: &str) -> Result<f64> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::invalid_number(field, text)),
    }
}

/// Parse a period, rejecting zero
pub fn parse_period(text: &str) -> Result<f64> {
    let period = parse_number("period", text)?;
    if period == 0.0 {
        return Err(Error::zero_period(text));
    }
    Ok(period)
}

/// Parse the editor fields into a spec.
///
/// Fields are checked in the order amplitude, baseline, period, phase; the
/// first failure is returned.
pub fn parse_waveform_spec(waveform: Waveform, text: &ParameterText) -> Result<WaveformSpec> {
    let amplitude = parse_number("amplitude", &text.amplitude)?;
    let baseline = parse_number("baseline", &text.baseline)?;
    let period = parse_period(&text.period)?;
    let phase = parse_number("phase", &text.phase)?;
    WaveformSpec::new(waveform, period, amplitude, baseline, phase)
}

/// Parse the requested number of synthesis components
pub fn parse_component_count(text: &str) -> Result<usize> {
    text.trim()
        .parse::<usize>()
        .map_err(|_| Error::InvalidParameter {
            field: "count",
            value: text.to_string(),
            reason: "enter a valid integer",
        })
}

/// Parse every row independently. Bad rows are dropped with a warning and
/// the remaining rows keep their order.
pub fn parse_composite(rows: &[ComponentRow]) -> (CompositeSpec, Vec<Warning>) {
    let mut composite = CompositeSpec::new();
    let mut warnings = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let parsed = row
            .kind
            .parse::<Waveform>()
            .and_then(|waveform| parse_waveform_spec(waveform, &row.fields));
        match parsed {
            Ok(spec) => composite.push(spec),
            Err(e) => {
                warn!("Signal {} rejected: {}", index + 1, e);
                warnings.push(Warning::DroppedComponent {
                    index,
                    reason: e.user_message(),
                });
            }
        }
    }

    (composite, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str, period: &str) -> ComponentRow {
        ComponentRow {
            kind: kind.to_string(),
            fields: ParameterText::new(period, "1", "0", "0"),
        }
    }

    #[test]
    fn test_parse_spec() {
        let text = ParameterText::new(" 2.0", "1.5", "-0.5", "0.25 ");
        let spec = parse_waveform_spec(Waveform::Triangle, &text).unwrap();
        assert_eq!(spec.period, 2.0);
        assert_eq!(spec.amplitude, 1.5);
        assert_eq!(spec.baseline, -0.5);
        assert_eq!(spec.phase, 0.25);
        assert_eq!(spec.waveform, Waveform::Triangle);
    }

    #[test]
    fn test_zero_period_message() {
        let text = ParameterText::new("0", "1", "0", "0");
        let err = parse_waveform_spec(Waveform::Sine, &text).unwrap_err();
        assert_eq!(err.user_message(), "Please enter a non-zero valid number!");
    }

    #[test]
    fn test_non_numeric_field() {
        let text = ParameterText::new("1", "loud", "0", "0");
        let err = parse_waveform_spec(Waveform::Sine, &text).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter {
                field: "amplitude",
                ..
            }
        ));
        assert_eq!(err.user_message(), "Please enter a valid number!");
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(parse_number("phase", "inf").is_err());
        assert!(parse_number("phase", "NaN").is_err());
    }

    #[test]
    fn test_component_count() {
        assert_eq!(parse_component_count(" 3 ").unwrap(), 3);
        assert!(parse_component_count("-1").is_err());
        assert!(parse_component_count("two").is_err());
    }

    #[test]
    fn test_parse_composite_drops_bad_rows() {
        let rows = vec![
            row("1", "2"),
            row("square", "0"),
            row("sawtooth", "x"),
            row("7", "1"),
            row("triangle", "4"),
        ];
        let (composite, warnings) = parse_composite(&rows);
        assert_eq!(composite.len(), 2);
        assert_eq!(composite.components()[0].waveform, Waveform::Sine);
        assert_eq!(composite.components()[1].waveform, Waveform::Triangle);
        let dropped: Vec<usize> = warnings
            .iter()
            .filter_map(|w| match w {
                Warning::DroppedComponent { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(dropped, vec![1, 2, 3]);
    }
}
