//! Session context
//!
//! One [`Session`] owns all mutable state of a visualization: the current
//! spec and domain, the composite, the active signal family, the current
//! sample sequence, and the animation and zoom state. Presentation code
//! drives it either through the typed methods or by sending [`Command`]s to
//! [`Session::handle`].
//!
//! Operations that need a sample sequence are silently ignored until one
//! exists; they return `false` / `None` so callers can tell.

use crate::animation::AnimationState;
use crate::config::Config;
use crate::ecg::{self, EcgPlayer, HeartRate};
use crate::error::{Error, Result, Warning};
use crate::params::{self, ParameterText};
use crate::spectrum::{Spectrum, SpectrumAnalyzer};
use crate::synthesizer::{synthesize, CompositeSpec};
use crate::transform::{add_noise, causal_moving_average, moving_average_full};
use crate::waveform::{generate, Domain, Waveform, WaveformSpec};
use crate::zoom::{ViewBounds, ZoomState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tracing::{debug, info, warn};

/// Which source feeds the current sample sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalFamily {
    /// One generated waveform
    Basic,
    /// Sum of the composite's components
    Synthesis,
    /// Prerecorded heart-rate trace
    Ecg,
}

impl fmt::Display for SignalFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalFamily::Basic => write!(f, "basic"),
            SignalFamily::Synthesis => write!(f, "synthesis"),
            SignalFamily::Ecg => write!(f, "ecg"),
        }
    }
}

/// Sample nearest to an inspected position
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    /// Clicked coordinates, two decimals
    pub label: String,
}

/// Input routed from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectFamily(SignalFamily),
    ClearFamily,
    SetWaveform(Waveform),
    EditParameters(ParameterText),
    SetComposite(CompositeSpec),
    ToggleSynthesis,
    SetHeartRatePosition(u8),
    AddNoise,
    Smooth,
    ZoomIn,
    ZoomOut,
    ToggleAnimation,
    Tick,
    Inspect { x: f64, y: f64 },
    Spectrum,
}

/// What the presentation layer should do after a command
#[derive(Debug)]
pub enum Outcome {
    /// Samples changed; show any warnings and redraw
    Redraw(Vec<Warning>),
    /// Only the view window changed
    View(ViewBounds),
    Point(Point),
    Spectrum(Spectrum),
    Animation { running: bool },
    /// Input rejected; the session is unchanged
    Rejected(Error),
    /// Nothing to do (no samples, or nothing under the cursor)
    Ignored,
}

pub struct Session {
    config: Config,
    spec: WaveformSpec,
    domain: Domain,
    composite: CompositeSpec,
    family: Option<SignalFamily>,
    heart_rate: Option<HeartRate>,
    /// Current samples and the family that produced them
    samples: Option<(SignalFamily, Vec<f64>)>,
    animation: AnimationState,
    zoom: ZoomState,
    player: EcgPlayer,
    analyzer: SpectrumAnalyzer,
    rng: StdRng,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Session with a fixed noise seed
    pub fn with_seed(config: Config, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let spec = config.signal.spec()?;
        let domain = Domain::new(spec.period, config.signal.cycles, config.signal.samples);
        let player = EcgPlayer::with_limit(&config.ecg.trace_dir, config.ecg.max_samples);

        Ok(Self {
            spec,
            domain,
            composite: CompositeSpec::new(),
            family: None,
            heart_rate: HeartRate::from_position(config.ecg.position),
            samples: None,
            animation: AnimationState::from_config(&config.animation),
            zoom: ZoomState::new(config.zoom.step),
            player,
            analyzer: SpectrumAnalyzer::new(),
            rng,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn spec(&self) -> &WaveformSpec {
        &self.spec
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn composite(&self) -> &CompositeSpec {
        &self.composite
    }

    pub fn family(&self) -> Option<SignalFamily> {
        self.family
    }

    pub fn heart_rate(&self) -> Option<HeartRate> {
        self.heart_rate
    }

    pub fn samples(&self) -> Option<&[f64]> {
        self.samples.as_ref().map(|(_, samples)| samples.as_slice())
    }

    /// Family that produced the current samples. Survives [`clear_family`].
    ///
    /// [`clear_family`]: Session::clear_family
    pub fn source(&self) -> Option<SignalFamily> {
        self.samples.as_ref().map(|(family, _)| *family)
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    /// X-coordinates paired with the current samples: the domain for
    /// generated signals, the sample index for the ECG trace
    pub fn x_values(&self) -> Vec<f64> {
        match &self.samples {
            Some((SignalFamily::Ecg, samples)) => (0..samples.len()).map(|i| i as f64).collect(),
            _ => self.domain.points().to_vec(),
        }
    }

    /// Switch the active family and regenerate from it
    pub fn select_family(&mut self, family: SignalFamily) -> Vec<Warning> {
        info!("Signal family: {}", family);
        self.family = Some(family);
        self.regenerate()
    }

    /// Deselect every family. The last samples stay available for viewing,
    /// but noise and smoothing are ignored until a family is selected again.
    pub fn clear_family(&mut self) {
        self.family = None;
    }

    /// Flip between basic and synthesized output; ignored for the ECG trace
    pub fn toggle_synthesis(&mut self) -> Option<SignalFamily> {
        let next = match self.family {
            Some(SignalFamily::Ecg) => return self.family,
            Some(SignalFamily::Synthesis) => SignalFamily::Basic,
            Some(SignalFamily::Basic) | None => SignalFamily::Synthesis,
        };
        self.select_family(next);
        self.family
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.spec.waveform = waveform;
        if self.family == Some(SignalFamily::Basic) {
            self.regenerate();
        }
    }

    /// Replace the spec wholesale. An invalid spec leaves everything as it was.
    pub fn set_spec(&mut self, spec: WaveformSpec) -> Result<()> {
        spec.validate()?;
        self.spec = spec;
        if self.domain.set_period(spec.period) {
            debug!("Domain rebuilt for period {}", spec.period);
        }
        if matches!(
            self.family,
            Some(SignalFamily::Basic | SignalFamily::Synthesis)
        ) {
            self.regenerate();
        }
        Ok(())
    }

    /// Parse edited parameter text for the current waveform and apply it
    pub fn edit_parameters(&mut self, text: &ParameterText) -> Result<()> {
        let spec = params::parse_waveform_spec(self.spec.waveform, text).map_err(|e| {
            warn!("Parameter edit rejected: {}", e);
            e
        })?;
        self.set_spec(spec)
    }

    pub fn set_composite(&mut self, composite: CompositeSpec) {
        info!("Composite set with {} component(s)", composite.len());
        self.composite = composite;
        if self.family == Some(SignalFamily::Synthesis) {
            self.regenerate();
        }
    }

    /// Move the heart-rate slider; reloads the trace when ECG is active
    pub fn set_heart_rate_position(&mut self, position: u8) -> Vec<Warning> {
        self.heart_rate = HeartRate::from_position(position);
        if self.family == Some(SignalFamily::Ecg) {
            self.regenerate()
        } else {
            Vec::new()
        }
    }

    /// Rebuild the sample sequence from the active family.
    ///
    /// Does nothing while no family is selected.
    pub fn regenerate(&mut self) -> Vec<Warning> {
        let Some(family) = self.family else {
            return Vec::new();
        };
        let (samples, warnings) = match family {
            SignalFamily::Basic => (generate(self.domain.points(), &self.spec), Vec::new()),
            SignalFamily::Synthesis => (
                synthesize(self.domain.points(), &self.composite, self.spec.phase),
                Vec::new(),
            ),
            SignalFamily::Ecg => {
                let load = self.player.load(self.heart_rate);
                let samples = load.samples.iter().map(|&v| f64::from(v)).collect();
                (samples, load.warnings)
            }
        };
        self.samples = Some((family, samples));
        warnings
    }

    /// Add Gaussian noise to the current samples.
    ///
    /// The ECG trace always gets the fixed ECG sigma; other families use the
    /// configured noise scale.
    pub fn add_noise(&mut self) -> bool {
        if self.family.is_none() {
            return false;
        }
        let Some((source, samples)) = self.samples.as_mut() else {
            return false;
        };
        let sigma = match source {
            SignalFamily::Ecg => self.config.transform.ecg_noise_sigma,
            SignalFamily::Basic | SignalFamily::Synthesis => self.config.transform.noise_scale,
        };
        add_noise(samples, sigma, &mut self.rng);
        true
    }

    /// Smooth the current samples with the family's moving average
    pub fn smooth(&mut self) -> bool {
        if !self.config.transform.apply_filter {
            return false;
        }
        if self.family.is_none() {
            return false;
        }
        let size = self.config.transform.filter_size;
        let Some((source, samples)) = self.samples.as_mut().filter(|(_, s)| !s.is_empty()) else {
            return false;
        };
        *samples = match source {
            SignalFamily::Ecg => causal_moving_average(samples, size),
            SignalFamily::Basic | SignalFamily::Synthesis => moving_average_full(samples, size),
        };
        true
    }

    /// Current view window, `None` without samples
    pub fn view_bounds(&self) -> Option<ViewBounds> {
        let (source, samples) = self.samples.as_ref().filter(|(_, s)| !s.is_empty())?;
        match source {
            SignalFamily::Ecg => Some(self.zoom.ecg_view_bounds(&self.config.zoom.ecg_window())),
            SignalFamily::Basic | SignalFamily::Synthesis => {
                self.zoom.view_bounds(self.domain.points(), samples)
            }
        }
    }

    pub fn zoom_in(&mut self) -> Option<ViewBounds> {
        self.view_bounds()?;
        self.zoom.zoom_in();
        self.view_bounds()
    }

    pub fn zoom_out(&mut self) -> Option<ViewBounds> {
        self.view_bounds()?;
        self.zoom.zoom_out();
        self.view_bounds()
    }

    /// Spectrum of the current samples at ten samples per spec period
    pub fn spectrum(&mut self) -> Result<Option<Spectrum>> {
        let Some((_, samples)) = self.samples.as_ref() else {
            return Ok(None);
        };
        let sample_rate = self.spec.spectrum_sample_rate();
        self.analyzer.analyze(samples, sample_rate).map(Some)
    }

    /// Nearest sample to `(x, y)`, if it lies within the inspection
    /// tolerance along both axes
    pub fn inspect(&self, x: f64, y: f64) -> Option<Point> {
        let samples = self.samples()?;
        let xs = self.x_values();
        let tolerance = self.config.inspect.tolerance;

        let (index, xi, yi) = xs
            .iter()
            .zip(samples)
            .enumerate()
            .map(|(i, (&xi, &yi))| (i, xi, yi))
            .min_by(|a, b| {
                let da = (a.1 - x).hypot(a.2 - y);
                let db = (b.1 - x).hypot(b.2 - y);
                da.total_cmp(&db)
            })?;

        if (xi - x).abs() > tolerance || (yi - y).abs() > tolerance {
            return None;
        }
        Some(Point {
            index,
            x: xi,
            y: yi,
            label: format!("({:.2}, {:.2})", x, y),
        })
    }

    /// Turn animation on or off. Enabling needs a sample sequence; returns
    /// whether animation is enabled afterwards.
    pub fn set_animation(&mut self, enabled: bool) -> bool {
        if enabled && self.samples.is_none() {
            debug!("Animation needs samples; ignoring");
            return false;
        }
        self.animation.enabled = enabled;
        enabled
    }

    pub fn toggle_animation(&mut self) -> bool {
        self.set_animation(!self.animation.enabled)
    }

    /// Advance one animation tick. Returns false while animation is off.
    pub fn animation_step(&mut self) -> bool {
        if !self.animation.enabled {
            return false;
        }
        match self.family {
            Some(SignalFamily::Ecg) => {
                if let Some((_, samples)) = self.samples.as_mut() {
                    ecg::step(samples.as_mut_slice(), self.animation.shift_amount);
                }
            }
            Some(SignalFamily::Basic | SignalFamily::Synthesis) => {
                self.spec.phase -= self.animation.phase_step;
                self.regenerate();
            }
            None => return false,
        }
        true
    }

    /// Dispatch one command
    pub fn handle(&mut self, command: Command) -> Outcome {
        match command {
            Command::SelectFamily(family) => Outcome::Redraw(self.select_family(family)),
            Command::ClearFamily => {
                self.clear_family();
                Outcome::Ignored
            }
            Command::SetWaveform(waveform) => {
                self.set_waveform(waveform);
                Outcome::Redraw(Vec::new())
            }
            Command::EditParameters(text) => match self.edit_parameters(&text) {
                Ok(()) => Outcome::Redraw(Vec::new()),
                Err(e) => Outcome::Rejected(e),
            },
            Command::SetComposite(composite) => {
                self.set_composite(composite);
                Outcome::Redraw(Vec::new())
            }
            Command::ToggleSynthesis => {
                self.toggle_synthesis();
                Outcome::Redraw(Vec::new())
            }
            Command::SetHeartRatePosition(position) => {
                Outcome::Redraw(self.set_heart_rate_position(position))
            }
            Command::AddNoise => redraw_if(self.add_noise()),
            Command::Smooth => redraw_if(self.smooth()),
            Command::ZoomIn => self.zoom_in().map_or(Outcome::Ignored, Outcome::View),
            Command::ZoomOut => self.zoom_out().map_or(Outcome::Ignored, Outcome::View),
            Command::ToggleAnimation => Outcome::Animation {
                running: self.toggle_animation(),
            },
            Command::Tick => redraw_if(self.animation_step()),
            Command::Inspect { x, y } => self.inspect(x, y).map_or(Outcome::Ignored, Outcome::Point),
            Command::Spectrum => match self.spectrum() {
                Ok(Some(spectrum)) => Outcome::Spectrum(spectrum),
                Ok(None) => Outcome::Ignored,
                Err(e) => Outcome::Rejected(e),
            },
        }
    }
}

fn redraw_if(changed: bool) -> Outcome {
    if changed {
        Outcome::Redraw(Vec::new())
    } else {
        Outcome::Ignored
    }
}
