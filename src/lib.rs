//! # Wavescope - Interactive Signal Visualization Core
//!
//! Wavescope is the numeric engine behind an interactive waveform viewer. It
//! produces sample sequences for plotting and applies live transforms to
//! them; drawing and widgets are left to the host application.
//!
//! ## Core Features
//!
//! - **Waveform Generation**: sine, triangle, sawtooth and square over a shared domain
//! - **Additive Synthesis**: sum any number of components with one animatable phase
//! - **ECG Playback**: prerecorded heart-rate traces with circular scrolling
//! - **Transforms**: Gaussian noise, two moving-average smoothers, axis zoom
//! - **Spectrum**: one-sided magnitude spectrum via real FFT
//! - **Animation**: cooperative ticker stepping phase or trace offset
//!
//! ## Quick Start
//!
//! ```rust
//! use wavescope::config::Config;
//! use wavescope::params::ParameterText;
//! use wavescope::session::{Session, SignalFamily};
//!
//! let mut session = Session::with_seed(Config::default(), 42).unwrap();
//! session.select_family(SignalFamily::Basic);
//!
//! // A rejected edit leaves the current signal in place
//! let err = session
//!     .edit_parameters(&ParameterText::new("0", "1", "0", "0"))
//!     .unwrap_err();
//! println!("{}", err.user_message());
//!
//! session.add_noise();
//! session.smooth();
//! let spectrum = session.spectrum().unwrap().unwrap();
//! println!("peak: {:?}", spectrum.peak());
//! ```
//!
//! ### Pure functions
//!
//! ```rust
//! use wavescope::waveform::{generate, Waveform, WaveformSpec};
//!
//! let spec = WaveformSpec::new(Waveform::Sine, 2.0, 1.0, 0.0, 0.0).unwrap();
//! let y = generate(&[0.0, 0.5, 1.0, 1.5], &spec);
//! assert!((y[1] - 1.0).abs() < 1e-12);
//! assert!((y[3] + 1.0).abs() < 1e-12);
//! ```

pub mod animation;
pub mod config;
pub mod ecg;
pub mod error;
pub mod export;
pub mod params;
pub mod session;
pub mod spectrum;
pub mod synthesizer;
pub mod transform;
pub mod waveform;
pub mod zoom;

pub use animation::{AnimationDriver, AnimationState, Ticker};
pub use config::Config;
pub use ecg::{EcgPlayer, HeartRate};
pub use error::{Error, Result, Warning};
pub use session::{Command, Outcome, Session, SignalFamily};
pub use spectrum::{Spectrum, SpectrumAnalyzer};
pub use synthesizer::{synthesize, CompositeSpec};
pub use waveform::{generate, Domain, Waveform, WaveformSpec};
pub use zoom::{ViewBounds, ZoomState};
