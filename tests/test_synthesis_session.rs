//! Tests for additive synthesis and the session commands around it

use std::fs;
use tempfile::tempdir;
use wavescope::config::Config;
use wavescope::params::{parse_composite, ComponentRow, ParameterText};
use wavescope::session::{Command, Outcome, Session, SignalFamily};
use wavescope::synthesizer::{load_composite, synthesize, CompositeSpec};
use wavescope::waveform::{generate, Domain, Waveform, WaveformSpec};
use wavescope::Warning;

fn spec(waveform: Waveform, period: f64, amplitude: f64, phase: f64) -> WaveformSpec {
    WaveformSpec::new(waveform, period, amplitude, 0.25, phase).unwrap()
}

// ========== Additivity ==========

#[test]
fn test_sum_of_shifted_components() {
    let domain = Domain::for_period(1.0);
    let a = spec(Waveform::Sine, 1.0, 1.0, 0.1);
    let b = spec(Waveform::Sawtooth, 0.3, 2.0, -0.4);
    let phi = 0.7;

    let composite = CompositeSpec::from(vec![a, b]);
    let y = synthesize(domain.points(), &composite, phi);
    let ya = generate(domain.points(), &a.with_phase_offset(phi));
    let yb = generate(domain.points(), &b.with_phase_offset(phi));

    for i in 0..y.len() {
        assert!((y[i] - (ya[i] + yb[i])).abs() < 1e-12, "Index {}", i);
    }
}

#[test]
fn test_order_does_not_change_sum() {
    let domain = Domain::for_period(2.0);
    let a = spec(Waveform::Triangle, 2.0, 1.0, 0.0);
    let b = spec(Waveform::Square, 0.5, 0.5, 0.0);

    let ab = synthesize(domain.points(), &CompositeSpec::from(vec![a, b]), 0.0);
    let ba = synthesize(domain.points(), &CompositeSpec::from(vec![b, a]), 0.0);
    for (x, y) in ab.iter().zip(&ba) {
        assert!((x - y).abs() < 1e-12);
    }
}

#[test]
fn test_empty_composite_is_zero() {
    let domain = Domain::for_period(1.0);
    let y = synthesize(domain.points(), &CompositeSpec::new(), 3.0);
    assert_eq!(y.len(), 1000);
    assert!(y.iter().all(|&v| v == 0.0));
}

// ========== Composite input ==========

#[test]
fn test_load_composite_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("components.toml");
    fs::write(
        &path,
        r#"
[[component]]
type = "sine"
period = 1.0

[[component]]
type = "square"
period = 0.0

[[component]]
type = "triangle"
period = 2.0
amplitude = 0.5
phase = 0.25
"#,
    )
    .unwrap();

    let (composite, warnings) = load_composite(&path).unwrap();
    assert_eq!(composite.len(), 2);
    assert_eq!(composite.components()[1].amplitude, 0.5);
    assert!(matches!(
        warnings.as_slice(),
        [Warning::DroppedComponent { index: 1, .. }]
    ));
}

#[test]
fn test_dialog_rows_drop_only_bad_entries() {
    let rows = vec![
        ComponentRow {
            kind: "2".to_string(),
            fields: ParameterText::new("1", "1", "0", "0"),
        },
        ComponentRow {
            kind: "1".to_string(),
            fields: ParameterText::new("0", "1", "0", "0"),
        },
    ];
    let (composite, warnings) = parse_composite(&rows);
    assert_eq!(composite.len(), 1);
    assert_eq!(composite.components()[0].waveform, Waveform::Triangle);
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].to_string(),
        "signal 2 dropped: Please enter a non-zero valid number!"
    );
}

// ========== Session ==========

#[test]
fn test_synthesis_animation_shares_phase() {
    let mut session = Session::with_seed(Config::default(), 5).unwrap();
    let a = spec(Waveform::Sine, 1.0, 1.0, 0.0);
    let b = spec(Waveform::Sine, 0.5, 0.5, 0.0);
    session.set_composite(CompositeSpec::from(vec![a, b]));
    session.select_family(SignalFamily::Synthesis);

    assert!(matches!(
        session.handle(Command::ToggleAnimation),
        Outcome::Animation { running: true }
    ));
    for _ in 0..4 {
        session.handle(Command::Tick);
    }

    let phase = session.spec().phase;
    assert!((phase + 0.2).abs() < 1e-12, "Phase {}", phase);
    let expected = synthesize(
        session.domain().points(),
        &CompositeSpec::from(vec![a, b]),
        phase,
    );
    assert_eq!(session.samples().unwrap(), expected.as_slice());
}

#[test]
fn test_generic_smoothing_truncates_full_convolution() {
    let mut session = Session::with_seed(Config::default(), 5).unwrap();
    session.select_family(SignalFamily::Basic);
    let raw = session.samples().unwrap().to_vec();
    session.handle(Command::Smooth);

    let smoothed = session.samples().unwrap();
    assert_eq!(smoothed.len(), raw.len());
    // Head ramps up through a partially filled window
    assert!((smoothed[0] - raw[0] / 5.0).abs() < 1e-12);
    assert!((smoothed[1] - (raw[0] + raw[1]) / 5.0).abs() < 1e-12);
}

#[test]
fn test_rejected_edit_keeps_samples() {
    let mut session = Session::with_seed(Config::default(), 5).unwrap();
    session.select_family(SignalFamily::Basic);
    let before = session.samples().unwrap().to_vec();

    let outcome = session.handle(Command::EditParameters(ParameterText::new(
        "1", "abc", "0", "0",
    )));
    match outcome {
        Outcome::Rejected(e) => assert_eq!(e.user_message(), "Please enter a valid number!"),
        other => panic!("Expected rejection, got {:?}", other),
    }
    assert_eq!(session.samples().unwrap(), before.as_slice());
}
