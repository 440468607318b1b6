//! Batch orchestration: select rows, resolve each one in order, write results
//! back in place, checkpoint periodically.
//!
//! A failing row never aborts the run. Its message lands in the
//! `enrich_error` column and the loop moves on; only a missing name column
//! is fatal, and that is detected before any row is touched.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use backfill_core::{Sleeper, shutdown_flag};
use backfill_providers::ProviderSet;
use indicatif::ProgressBar;

use crate::checkpoint::write_checkpoint;
use crate::record::{
    ENRICH_ERROR_COLUMN, EntityRecord, MAX_ERROR_CHARS, TargetField, is_blank, truncate_chars,
};
use crate::resolver::backfill_row;
use crate::summary::RunSummary;
use crate::table::Table;

pub const DEFAULT_NAME_FIELD: &str = "advertiser_name";
pub const DEFAULT_CHECKPOINT_PATH: &str = "enriched_partial.csv";
pub const DEFAULT_CHECKPOINT_EVERY: usize = 100;
pub const DEFAULT_ROW_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Column holding the entity name
    pub name_field: String,
    /// Pause after every processed row, success or failure
    pub delay: Duration,
    /// Checkpoint after this many processed rows; `None` or 0 disables
    pub checkpoint_every: Option<usize>,
    pub checkpoint_path: PathBuf,
    /// Process only rows with at least one blank target field
    pub only_missing: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            name_field: DEFAULT_NAME_FIELD.to_string(),
            delay: DEFAULT_ROW_DELAY,
            checkpoint_every: Some(DEFAULT_CHECKPOINT_EVERY),
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            only_missing: true,
        }
    }
}

#[derive(Debug)]
pub enum EnrichError {
    /// The configured name column is not in the table
    MissingColumn(String),
}

impl std::fmt::Display for EnrichError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(name) => write!(f, "name column {name:?} not found in input"),
        }
    }
}

impl std::error::Error for EnrichError {}

/// Enrich `table` in place, stopping early when the process shutdown flag is raised.
pub fn enrich(
    table: &mut Table,
    providers: &mut ProviderSet,
    sleeper: &dyn Sleeper,
    options: &EnrichOptions,
    progress: &ProgressBar,
) -> Result<RunSummary, EnrichError> {
    enrich_until(table, providers, sleeper, options, progress, shutdown_flag())
}

/// Same as [`enrich`] with an explicit stop flag, checked before each row.
pub fn enrich_until(
    table: &mut Table,
    providers: &mut ProviderSet,
    sleeper: &dyn Sleeper,
    options: &EnrichOptions,
    progress: &ProgressBar,
    stop: &AtomicBool,
) -> Result<RunSummary, EnrichError> {
    let started = Instant::now();
    let name_col = table
        .column_index(&options.name_field)
        .ok_or_else(|| EnrichError::MissingColumn(options.name_field.clone()))?;

    let target_cols: Vec<(TargetField, usize)> = TargetField::ALL
        .into_iter()
        .map(|field| (field, table.ensure_column(field.column())))
        .collect();
    let error_col = table.ensure_column(ENRICH_ERROR_COLUMN);

    let selected: Vec<usize> = (0..table.len())
        .filter(|&row| {
            !options.only_missing
                || target_cols
                    .iter()
                    .any(|&(_, col)| is_blank(table.get(row, col)))
        })
        .collect();

    log::info!(
        "Enriching {} of {} rows (name column {:?})",
        selected.len(),
        table.len(),
        options.name_field
    );
    progress.set_length(selected.len() as u64);

    let mut summary = RunSummary {
        total_rows: table.len(),
        selected: selected.len(),
        ..Default::default()
    };
    let checkpoint_every = options.checkpoint_every.filter(|&n| n > 0);

    for &row in &selected {
        if stop.load(Ordering::Relaxed) {
            log::warn!(
                "Stop requested after {} of {} rows",
                summary.processed,
                summary.selected
            );
            summary.interrupted = true;
            break;
        }

        let record = EntityRecord::from_table(table, row, name_col);
        progress.set_message(record.name.clone());

        match backfill_row(providers, &record) {
            Ok(changes) if changes.is_empty() => summary.unchanged += 1,
            Ok(changes) => {
                log::debug!("row {row} {:?}: {} field(s)", record.name, changes.len());
                for (field, value) in changes {
                    if let Some(&(_, col)) = target_cols.iter().find(|(f, _)| *f == field) {
                        table.set(row, col, Some(value));
                    }
                }
                summary.updated += 1;
            }
            Err(e) => {
                log::warn!("row {row} {:?}: {e}", record.name);
                let message = truncate_chars(&e.to_string(), MAX_ERROR_CHARS).to_string();
                table.set(row, error_col, Some(message));
                summary.errored += 1;
            }
        }

        summary.processed += 1;
        progress.inc(1);
        sleeper.sleep(options.delay);

        if checkpoint_every.is_some_and(|n| summary.processed % n == 0) {
            checkpoint(table, options, &mut summary);
        }
    }

    if summary.interrupted {
        checkpoint(table, options, &mut summary);
    }

    progress.finish_and_clear();
    summary.elapsed = started.elapsed();
    summary.providers = providers.cache_report();
    log::info!("{}", summary.headline());
    Ok(summary)
}

/// Best effort: a failed write is logged and counted, never propagated
fn checkpoint(table: &Table, options: &EnrichOptions, summary: &mut RunSummary) {
    let path = &options.checkpoint_path;
    match write_checkpoint(table, path) {
        Ok(()) => {
            summary.checkpoints_written += 1;
            log::debug!(
                "checkpoint {} after {} rows",
                path.display(),
                summary.processed
            );
        }
        Err(e) => {
            summary.checkpoint_failures += 1;
            log::warn!("checkpoint {} failed: {e}", path.display());
        }
    }
}
