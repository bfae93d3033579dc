//! Additive synthesis of several waveforms over one shared domain

use crate::error::{Result, Warning};
use crate::waveform::{Waveform, WaveformSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Ordered set of component waveforms.
///
/// Insertion order is evaluation order; it only matters for display since
/// the sum is commutative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeSpec {
    components: Vec<WaveformSpec>,
}

impl CompositeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spec: WaveformSpec) {
        self.components.push(spec);
    }

    pub fn components(&self) -> &[WaveformSpec] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Build from unvalidated entries, dropping (and reporting) any entry
    /// whose period is zero or whose fields are not finite.
    pub fn from_entries(entries: &[ComponentEntry]) -> (Self, Vec<Warning>) {
        let mut composite = Self::new();
        let mut warnings = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            match entry.to_spec() {
                Ok(spec) => composite.push(spec),
                Err(e) => {
                    warn!("Dropping signal {}: {}", index + 1, e);
                    warnings.push(Warning::DroppedComponent {
                        index,
                        reason: e.user_message(),
                    });
                }
            }
        }

        (composite, warnings)
    }
}

impl From<Vec<WaveformSpec>> for CompositeSpec {
    fn from(components: Vec<WaveformSpec>) -> Self {
        Self { components }
    }
}

/// One component as written in a composite file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEntry {
    #[serde(rename = "type")]
    pub waveform: Waveform,
    pub period: f64,
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    #[serde(default)]
    pub baseline: f64,
    #[serde(default)]
    pub phase: f64,
}

fn default_amplitude() -> f64 {
    1.0
}

impl ComponentEntry {
    pub fn to_spec(&self) -> Result<WaveformSpec> {
        WaveformSpec::new(
            self.waveform,
            self.period,
            self.amplitude,
            self.baseline,
            self.phase,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct CompositeFile {
    #[serde(default, rename = "component")]
    components: Vec<ComponentEntry>,
}

/// Load a composite from a TOML file of `[[component]]` tables.
///
/// Invalid entries are dropped with a warning; the rest of the batch is kept.
pub fn load_composite(path: &Path) -> Result<(CompositeSpec, Vec<Warning>)> {
    info!("Loading composite from {:?}", path);
    let text = fs::read_to_string(path)?;
    let file: CompositeFile = toml::from_str(&text)?;
    let (composite, warnings) = CompositeSpec::from_entries(&file.components);
    info!(
        "Loaded {} component(s), dropped {}",
        composite.len(),
        warnings.len()
    );
    Ok((composite, warnings))
}

/// Sum every component over `domain`, each shifted by `global_phase`.
///
/// An empty composite yields all zeros of the domain's length.
pub fn synthesize(domain: &[f64], composite: &CompositeSpec, global_phase: f64) -> Vec<f64> {
    let mut output = vec![0.0; domain.len()];

    for spec in composite.components() {
        let shifted = spec.with_phase_offset(global_phase);
        for (out, &x) in output.iter_mut().zip(domain) {
            *out += shifted.sample(x);
        }
    }

    debug!(
        "Synthesized {} component(s) over {} points",
        composite.len(),
        domain.len()
    );
    output
}
