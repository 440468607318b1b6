//! Lookup subcommand - resolve a single name and print what the providers return

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use backfill_core::ThreadSleeper;
use backfill_engine::{EntityRecord, TargetField, backfill_row};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Entity name, e.g. "Acme Corp"
    pub name: String,
}

pub fn run(args: LookupArgs, config: &Config) -> Result<()> {
    let mut providers = super::live_providers(config, Arc::new(ThreadSleeper))?;
    let record = EntityRecord::new(&args.name);
    let changes = backfill_row(&mut providers, &record)?;

    let rows: Vec<(&str, String)> = TargetField::ALL
        .into_iter()
        .map(|field| {
            let value = changes.get(&field).cloned().unwrap_or_else(|| "-".to_string());
            (field.column(), value)
        })
        .collect();
    super::print_summary(&record.name, &rows);
    Ok(())
}
