#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a snake game with the autopilot.

mod session;
mod session_token;
mod settings;
mod wire;

use std::{
    env,
    fs::OpenOptions,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use session_token::SessionToken;
use settings::{CalibrationChoice, SessionMode, SessionSettings, SettingsLayer};

/// Environment variable that enables debug logging when set to `true`.
const DEBUG_ENV: &str = "SNAKE_DEBUG";

/// Command-line arguments accepted by the driver.
#[derive(Debug, Parser)]
#[command(
    name = "snake-autopilot",
    version,
    about = "Plays snake on a grid, steered by a breadth-first autopilot or a move script."
)]
struct Args {
    /// Number of grid columns.
    #[arg(long)]
    width: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    height: Option<u32>,
    /// Seed for food placement; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many ticks.
    #[arg(long, value_name = "TICKS")]
    max_ticks: Option<u64>,
    /// Who steers the snake.
    #[arg(long, value_enum)]
    mode: Option<SessionMode>,
    /// Scripted directions, one per tick (`U`, `D`, `L`, `R`, or `.` to keep going).
    #[arg(long, value_name = "UDLR")]
    moves: Option<String>,
    /// Whether calibration contributions shift food collisions.
    #[arg(long, value_enum)]
    calibration: Option<CalibrationChoice>,
    /// Draw a text frame after every tick.
    #[arg(long)]
    render: bool,
    /// Stream one JSON snapshot per tick.
    #[arg(long)]
    json: bool,
    /// TOML session file; flags given on the command line take precedence.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Replay token printed at the end of an earlier run.
    #[arg(long, value_name = "TOKEN")]
    replay: Option<String>,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
    /// Append log output to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Resolves defaults, the session file, the replay token and flags, in
    /// increasing order of precedence.
    fn resolve(&self) -> Result<SessionSettings> {
        let mut settings = SessionSettings::default();
        if let Some(path) = &self.config {
            settings = settings.apply(SettingsLayer::load(path)?)?;
        }
        if let Some(token) = &self.replay {
            let token = SessionToken::decode(token).context("invalid replay token")?;
            settings = settings.apply(token.into_layer())?;
        }
        settings.apply(self.layer())
    }

    fn layer(&self) -> SettingsLayer {
        SettingsLayer {
            width: self.width,
            height: self.height,
            seed: self.seed,
            max_ticks: self.max_ticks,
            mode: self.mode,
            calibration: self.calibration.map(Into::into),
            moves: self.moves.clone(),
            render: self.render.then_some(true),
            json: self.json.then_some(true),
        }
    }
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let debug = verbose
        || env::var(DEBUG_ENV).map_or(false, |value| value.eq_ignore_ascii_case("true"));
    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    Ok(())
}

/// Entry point for the snake autopilot command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.log_file.as_deref())?;
    let settings = args.resolve()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = session::run(&settings, &mut out)?;
    if settings.json {
        eprintln!("{summary}");
    } else {
        writeln!(out, "{summary}")?;
    }
    out.flush()?;
    Ok(())
}
