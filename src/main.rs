//! Wavescope CLI - generate, transform and inspect signals from the terminal

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wavescope::animation::AnimationDriver;
use wavescope::config::Config;
use wavescope::ecg::HEART_RATES;
use wavescope::export::{self, SignalStats, DEFAULT_WAV_RATE};
use wavescope::params::ParameterText;
use wavescope::session::{Command, Outcome, Session, SignalFamily};
use wavescope::synthesizer::load_composite;
use wavescope::waveform::Waveform;
use wavescope::Warning;

#[derive(Parser)]
#[command(name = "wavescope")]
#[command(about = "Waveform generation, synthesis and ECG playback", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/wavescope.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Waveform selection shared by several subcommands
#[derive(Args, Clone)]
struct SignalArgs {
    /// Waveform name or code (1 sine, 2 triangle, 3 sawtooth, 4 square)
    #[arg(short = 't', long = "type", default_value = "sine")]
    waveform: Waveform,

    #[arg(short, long, default_value = "1")]
    period: String,

    #[arg(short, long, default_value = "1")]
    amplitude: String,

    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    baseline: String,

    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    phase: String,
}

impl SignalArgs {
    fn text(&self) -> ParameterText {
        ParameterText::new(&self.period, &self.amplitude, &self.baseline, &self.phase)
    }
}

/// Transforms applied after generation
#[derive(Args, Clone, Copy)]
struct TransformArgs {
    /// Add Gaussian noise
    #[arg(long)]
    noise: bool,

    /// Apply the moving-average smoother
    #[arg(long)]
    smooth: bool,

    /// Seed for the noise generator
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one waveform
    Generate {
        #[command(flatten)]
        signal: SignalArgs,

        #[command(flatten)]
        transform: TransformArgs,

        /// Output file (.wav for audio, anything else for CSV)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Sum the components listed in a TOML file
    Synth {
        /// File of [[component]] tables
        components: PathBuf,

        /// Shared phase added to every component
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        phase: String,

        /// Domain period (defaults to the config's signal period)
        #[arg(short, long)]
        period: Option<String>,

        #[command(flatten)]
        transform: TransformArgs,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Load a prerecorded ECG trace
    Ecg {
        /// Slider position 0-7 (0 = none)
        #[arg(long, conflicts_with = "bpm")]
        position: Option<u8>,

        /// Heart rate in beats per minute
        #[arg(long)]
        bpm: Option<u16>,

        /// Directory holding bpm<N>.csv files
        #[arg(long)]
        trace_dir: Option<PathBuf>,

        /// Scroll the trace this many animation steps
        #[arg(long, default_value = "0")]
        ticks: u32,

        #[command(flatten)]
        transform: TransformArgs,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the spectrum peak of a waveform
    Spectrum {
        #[command(flatten)]
        signal: SignalArgs,

        #[command(flatten)]
        transform: TransformArgs,

        /// Write all bins as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Run the animation driver for a number of ticks
    Animate {
        #[command(flatten)]
        signal: SignalArgs,

        /// Ticks to run
        #[arg(long, default_value = "20")]
        ticks: u32,

        /// Tick interval in milliseconds (defaults to the config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    // -v wins over RUST_LOG; with neither, log at info
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            signal,
            transform,
            out,
        } => {
            let mut session = basic_session(config, &signal, transform.seed)?;
            apply_transforms(&mut session, transform);
            finish(&session, out.as_deref())?;
        }

        Commands::Synth {
            components,
            phase,
            period,
            transform,
            out,
        } => {
            let (composite, warnings) = load_composite(&components)?;
            report(&warnings);

            let mut session = new_session(config, transform.seed)?;
            let mut spec = *session.spec();
            let text = ParameterText::new(
                period.as_deref().unwrap_or(&spec.period.to_string()),
                &spec.amplitude.to_string(),
                &spec.baseline.to_string(),
                &phase,
            );
            spec = wavescope::params::parse_waveform_spec(spec.waveform, &text)?;
            session.set_spec(spec)?;
            session.set_composite(composite);
            session.select_family(SignalFamily::Synthesis);
            apply_transforms(&mut session, transform);
            finish(&session, out.as_deref())?;
        }

        Commands::Ecg {
            position,
            bpm,
            trace_dir,
            ticks,
            transform,
            out,
        } => {
            if let Some(dir) = trace_dir {
                config.ecg.trace_dir = dir;
            }
            let position = match (position, bpm) {
                (Some(position), _) => position,
                (None, Some(bpm)) => bpm_position(bpm)?,
                (None, None) => config.ecg.position,
            };

            let mut session = new_session(config, transform.seed)?;
            session.set_heart_rate_position(position);
            report(&session.select_family(SignalFamily::Ecg));
            apply_transforms(&mut session, transform);

            if ticks > 0 {
                if let Outcome::Animation { running: false } =
                    session.handle(Command::ToggleAnimation)
                {
                    warn!("Nothing to scroll");
                }
                for _ in 0..ticks {
                    session.handle(Command::Tick);
                }
            }
            finish(&session, out.as_deref())?;
        }

        Commands::Spectrum {
            signal,
            transform,
            json,
        } => {
            let mut session = basic_session(config, &signal, transform.seed)?;
            apply_transforms(&mut session, transform);
            let Some(spectrum) = session.spectrum()? else {
                println!("No samples");
                return Ok(());
            };
            match spectrum.peak() {
                Some((frequency, magnitude)) => {
                    println!("Peak: {frequency:.4} (magnitude {magnitude:.4})")
                }
                None => println!("No non-DC bins"),
            }
            println!("Bins: {}", spectrum.len());
            if let Some(path) = json {
                export::write_spectrum_json(&path, &spectrum)?;
            }
        }

        Commands::Animate {
            signal,
            ticks,
            interval_ms,
        } => {
            if let Some(ms) = interval_ms {
                config.animation.tick_interval_ms = ms;
            }
            let mut driver = AnimationDriver::new(&config.animation);
            let interval = Duration::from_millis(config.animation.tick_interval_ms);
            let mut session = basic_session(config, &signal, None)?;

            if !driver.enable(&mut session, Instant::now()) {
                println!("No samples to animate");
                return Ok(());
            }
            let mut done = 0;
            while done < ticks {
                std::thread::sleep(interval);
                let applied = driver.poll_at_most(&mut session, Instant::now(), ticks - done);
                if applied == 0 {
                    continue;
                }
                done += applied;
                let first = session.samples().and_then(|s| s.first()).copied();
                println!(
                    "tick {:>4} (+{}): phase {:+.3}  y[0] {:+.4}",
                    done,
                    applied,
                    session.spec().phase,
                    first.unwrap_or(0.0)
                );
            }
            driver.disable(&mut session);
        }
    }

    Ok(())
}

fn new_session(config: Config, seed: Option<u64>) -> wavescope::Result<Session> {
    match seed {
        Some(seed) => Session::with_seed(config, seed),
        None => Session::new(config),
    }
}

fn basic_session(
    config: Config,
    signal: &SignalArgs,
    seed: Option<u64>,
) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = new_session(config, seed)?;
    session.set_waveform(signal.waveform);
    if let Err(e) = session.edit_parameters(&signal.text()) {
        return Err(e.user_message().into());
    }
    session.select_family(SignalFamily::Basic);
    Ok(session)
}

fn apply_transforms(session: &mut Session, transform: TransformArgs) {
    if transform.noise {
        session.add_noise();
    }
    if transform.smooth {
        session.smooth();
    }
}

fn bpm_position(bpm: u16) -> Result<u8, String> {
    HEART_RATES
        .iter()
        .position(|&rate| rate == bpm)
        .map(|i| i as u8 + 1)
        .ok_or_else(|| format!("no trace for {bpm} bpm (available: {HEART_RATES:?})"))
}

fn report(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

fn finish(session: &Session, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(samples) = session.samples() else {
        println!("No samples");
        return Ok(());
    };
    match SignalStats::from_samples(samples) {
        Some(stats) => stats.print_summary(),
        None => println!("Empty signal"),
    }

    if let Some(path) = out {
        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav {
            export::write_wav(path, samples, DEFAULT_WAV_RATE)?;
        } else {
            export::write_csv(path, &session.x_values(), samples)?;
        }
        debug!("Exported to {:?}", path);
    }
    Ok(())
}
