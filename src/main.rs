//! aedt-boundaries: replays a boundary configuration against the in-memory
//! engine and prints the resulting automation calls.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use aedt_boundaries::aedt::io::{
    export_configuration, import_configuration, import_power_map, read_configuration,
    write_configuration,
};
use aedt_boundaries::aedt::{EngineSession, InMemoryEngine, ThermalDesign};
use aedt_boundaries::config::{self, Config};
use aedt_boundaries::error::Result;

/// Dry-run tool for thermal boundary configurations.
///
/// Re-creates the boundaries and native components of a configuration file
/// against an in-memory engine and prints every automation call it would
/// make, as JSON.
#[derive(Parser, Debug)]
#[command(name = "aedt-boundaries")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file to replay
    #[arg(value_name = "CONFIGURATION_JSON")]
    configuration: PathBuf,

    /// Path to settings file
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Sherlock power map to assign as solid blocks
    #[arg(long, value_name = "CSV")]
    power_map: Option<PathBuf>,

    /// Write the resulting configuration to this path
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Replays the configuration and prints the call log.
///
/// Returns false if any object could not be re-created.
fn run(args: &Args, cfg: &Config) -> Result<bool> {
    let configuration = read_configuration(&args.configuration)?;

    let engine = InMemoryEngine::new();
    for object in &configuration.objects {
        engine.add_object(object.as_str());
    }
    let design = ThermalDesign::new(EngineSession::new(engine.clone()), cfg.design_settings());

    let summary = import_configuration(&design, &configuration);
    for failure in &summary.failures {
        warn!(name = %failure.name, reason = %failure.reason, "Object not re-created");
    }

    if let Some(path) = &args.power_map {
        let report = import_power_map(&design, path)?;
        info!(
            blocks = report.blocks.len(),
            total_power_w = report.total_power_w,
            "Power map assigned"
        );
    }

    if let Some(path) = &args.export {
        write_configuration(path, &export_configuration(&design)?)?;
        info!(path = %path.display(), "Configuration exported");
    }

    print_calls(&engine)?;
    Ok(summary.is_complete())
}

fn print_calls(engine: &InMemoryEngine) -> Result<()> {
    let json = serde_json::to_string_pretty(&engine.calls())
        .map_err(aedt_boundaries::aedt::AedtError::from)?;
    println!("{json}");
    Ok(())
}

fn config_hint(path: Option<&Path>) {
    if path.is_none() {
        if let Some(default_path) = config::default_config_path() {
            eprintln!("\nSettings are read from: {}", default_path.display());
        }
    }
}

/// Entry point for the aedt-boundaries tool.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_or_default(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            config_hint(config_path);
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "aedt-boundaries {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        configuration = %args.configuration.display(),
        "Replaying configuration"
    );

    match run(&args, &cfg) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("Some objects could not be re-created");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "Replay failed");
            ExitCode::FAILURE
        }
    }
}
