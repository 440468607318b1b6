//! backfill - fill missing company attributes from public data providers
//!
//! Reads a CSV keyed by entity name and backfills identifier, country,
//! industry, headquarters, inception and website from Wikipedia, Wikidata,
//! Clearbit and OpenCorporates.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "backfill")]
#[command(about = "Backfill missing entity attributes from public data providers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./backfill.toml or ~/.config/backfill/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Maximum attempts per request, overriding the config file
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Per-request timeout in seconds for every provider, overriding the config file
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Enrich a CSV file in batch
    Enrich(cmd::enrich::EnrichArgs),
    /// Resolve one name and print the result
    Lookup(cmd::lookup::LookupArgs),
    /// Show current configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(backfill_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug; progress bars show activity
    //   non-TTY: info unless --debug; logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    backfill_core::init_logging(quiet, cli.debug, multi);

    let loaded = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(c) => c.with_overrides(cli.max_attempts, cli.timeout),
        Err(e) => {
            log::error!("Configuration error: {e:#}");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Command::Enrich(args) => cmd::enrich::run(args, &config, &progress),
        Command::Lookup(args) => cmd::lookup::run(args, &config).map(|()| ExitCode::SUCCESS),
        Command::Config => {
            cmd::show_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("Fatal error: {e:#}");
            ExitCode::from(2)
        }
    }
}
