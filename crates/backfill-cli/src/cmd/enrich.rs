//! Enrich subcommand - backfill a CSV of entity names

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Args;

use backfill_core::{SharedProgress, Sleeper, ThreadSleeper, fmt_num, shutdown_flag};
use backfill_engine::{EnrichOptions, Table, enrich};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Input CSV with one entity per row
    pub input: PathBuf,

    /// Output CSV (default: <input>_enriched.csv next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Column holding the entity name
    #[arg(short, long)]
    pub name_field: Option<String>,

    /// Pause after each row in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Checkpoint every N processed rows (0 disables)
    #[arg(long)]
    pub checkpoint_every: Option<usize>,

    /// Checkpoint file path
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Process every row, not only rows with a missing field
    #[arg(long)]
    pub all: bool,
}

impl EnrichArgs {
    /// Config file values overridden by explicit flags
    fn options(&self, config: &Config) -> EnrichOptions {
        let mut options = config.enrich.options();
        if let Some(name) = &self.name_field {
            options.name_field = name.clone();
        }
        if let Some(ms) = self.delay_ms {
            options.delay = std::time::Duration::from_millis(ms);
        }
        if let Some(n) = self.checkpoint_every {
            options.checkpoint_every = Some(n).filter(|&n| n > 0);
        }
        if let Some(path) = &self.checkpoint {
            options.checkpoint_path = path.clone();
        }
        if self.all {
            options.only_missing = false;
        }
        options
    }
}

pub fn run(args: EnrichArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    setup_signal_handler()?;
    let options = args.options(config);

    let mut table = Table::read_csv(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    log::info!(
        "Loaded {} rows from {}",
        fmt_num(table.len()),
        args.input.display()
    );

    let sleeper: Arc<dyn Sleeper> = Arc::new(ThreadSleeper);
    let mut providers = super::live_providers(config, sleeper.clone())?;
    let pb = progress.rows_bar("enrich", table.len());

    let summary = enrich(&mut table, &mut providers, sleeper.as_ref(), &options, &pb)?;

    let output = args.output.unwrap_or_else(|| default_output(&args.input));
    table
        .write_csv(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if progress.is_tty() {
        progress.println(summary.format_table());
    } else {
        summary.log();
    }
    log::info!("Wrote {}", output.display());

    if summary.interrupted {
        log::warn!("Interrupted; rerun on {} to resume", output.display());
        return Ok(ExitCode::from(130));
    }
    Ok(ExitCode::SUCCESS)
}

/// `dir/ads.csv` → `dir/ads_enriched.csv`
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_enriched.csv"))
}

fn setup_signal_handler() -> Result<()> {
    // First signal: set graceful shutdown flag
    // Second signal: force exit
    // SAFETY: AtomicBool::swap and process::exit are async-signal-safe
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, || {
            if shutdown_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .context("Failed to register SIGTERM handler")?;
        signal_hook::low_level::register(signal_hook::consts::SIGINT, || {
            if shutdown_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .context("Failed to register SIGINT handler")?;
    }
    Ok(())
}
