//! `trailsense` command line: replay recorded frames through the engine,
//! smoke-test the LED bridge and write a default config.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use trailsense::engine::{LandmarkArchive, NullArchive};
use trailsense::frames::{list_frames, replay, DirectoryArchive, ModeRequest, ReplayOptions};
use trailsense::signal::open_signal_port;
use trailsense::{SignalColor, TrailsenseConfig};

#[derive(Parser, Debug)]
#[command(name = "trailsense", author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a directory of frames through the engine.
    Replay(ReplayArgs),
    /// Send one color to the configured signal port.
    Signal {
        /// RED, GREEN, AMBER or OFF.
        color: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration as JSON.
    InitConfig { path: PathBuf },
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Directory of frames, processed in file name order.
    #[arg(long)]
    frames: PathBuf,

    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Switch to RETURN before this frame index.
    #[arg(long)]
    return_at: Option<usize>,

    /// Extra mode requests as INDEX=MODE (repeatable).
    #[arg(long = "mode", value_name = "INDEX=MODE")]
    modes: Vec<ModeRequest>,

    /// Frame rate used to timestamp frames.
    #[arg(long, default_value_t = 10.0)]
    fps: f64,

    /// Write annotated frames here.
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// Write the JSON session report here.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Override the landmark image directory.
    #[arg(long)]
    landmark_dir: Option<PathBuf>,

    /// Do not persist landmark images.
    #[arg(long)]
    no_archive: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Replay(args) => run_replay(args),
        Command::Signal { color, config } => {
            let color: SignalColor = color.parse()?;
            let cfg = load_config(config.as_ref())?;
            let mut port = open_signal_port(&cfg.signal.with_env_overrides())?;
            port.signal(color);
            println!("sent {color}");
            Ok(())
        }
        Command::InitConfig { path } => {
            TrailsenseConfig::default().write_json(&path)?;
            println!("wrote default config to {}", path.display());
            Ok(())
        }
    }
}

fn run_replay(args: ReplayArgs) -> Result<(), Box<dyn Error>> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(format!("--fps must be positive, got {}", args.fps).into());
    }

    let mut cfg = load_config(args.config.as_ref())?;
    if let Some(dir) = args.landmark_dir {
        cfg.landmark_dir = dir;
    }

    let signal = open_signal_port(&cfg.signal.clone().with_env_overrides())?;
    let archive: Box<dyn LandmarkArchive> = if args.no_archive || !cfg.archive_landmarks {
        Box::new(NullArchive)
    } else {
        Box::new(DirectoryArchive::new(&cfg.landmark_dir)?)
    };
    let mut engine = cfg.build_engine(signal, archive)?;

    let frames = list_frames(&args.frames)?;
    let mut options = ReplayOptions {
        fps: args.fps,
        mode_requests: args.modes,
        annotated_dir: args.annotated,
    };
    if let Some(index) = args.return_at {
        options = options.return_at(index);
    }

    let report = replay(&mut engine, &frames, &options)?;
    for request in report.mode_requests.iter().filter(|r| r.error.is_some()) {
        log::warn!(
            "mode request {:?} before frame {} was rejected",
            request.requested,
            request.before_frame
        );
    }

    let state = engine.state();
    println!(
        "processed {} frames, {} landmarks, final mode {}: {}",
        report.frames.len(),
        report.landmarks.len(),
        state.mode,
        state.status
    );

    if let Some(path) = args.report {
        report.write_json(&path)?;
        println!("wrote report JSON to {}", path.display());
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<TrailsenseConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(TrailsenseConfig::load_json(path)?),
        None => Ok(TrailsenseConfig::default()),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    #[cfg(feature = "tracing")]
    {
        let _ = (verbose, quiet);
        let _ = tracing_log::LogTracer::init();
        trailsense::core::init_tracing(false);
    }

    #[cfg(not(feature = "tracing"))]
    {
        let level = trailsense::core::level_from_verbosity(verbose, quiet);
        let _ = trailsense::core::init_with_level(level);
    }
}
