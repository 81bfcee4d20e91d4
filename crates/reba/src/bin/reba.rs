use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use reba::score::ValidationPolicy;
use reba::{replay, FrameLog, InProcessBackend, RebaConfig, RebaEngine, RebaRequest, Session};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "reba", version, about = "REBA posture scoring")]
struct Cli {
    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,
    /// Emit logs as JSON lines.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,
    /// JSON config with `engine` and `session` sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one request (`{ landmarks, calibInputs }`) and print the response.
    Score {
        #[arg(long)]
        input: PathBuf,
        /// Reject missing or invalid calibration fields instead of defaulting them.
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay a timestamped frame log and print the trend report.
    Session {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    reba::init_with_level(cli.log_level)?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    reba::init_tracing(cli.log_json);
    log::set_max_level(cli.log_level);
    Ok(())
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = match &cli.config {
        Some(path) => RebaConfig::load_json(path)?,
        None => RebaConfig::default(),
    };

    match cli.command {
        Commands::Score {
            input,
            strict,
            output,
        } => {
            if strict {
                config.engine.validation = ValidationPolicy::Strict;
            }
            let request = RebaRequest::load_json(&input)?;
            let response = RebaEngine::new(config.engine).score_request(&request)?;
            emit(&response, output.as_deref())?;
        }
        Commands::Session { input, output } => {
            let log = FrameLog::load_json(&input)?;
            let backend = InProcessBackend::new(config.engine);
            let mut session = Session::new(backend, config.session);
            let report = replay(&mut session, &log);
            emit(&report, output.as_deref())?;
        }
    }
    Ok(())
}
