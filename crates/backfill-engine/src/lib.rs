//! Backfill Engine - row resolution and batch orchestration
//!
//! Reads a table of entities keyed by name, fills the missing target columns
//! from the configured providers, and checkpoints progress to disk.

pub mod checkpoint;
pub mod enrich;
pub mod record;
pub mod resolver;
pub mod summary;
pub mod table;

#[cfg(test)]
mod fakes;

pub use checkpoint::write_checkpoint;
pub use enrich::{EnrichError, EnrichOptions, enrich, enrich_until};
pub use record::{ENRICH_ERROR_COLUMN, EntityRecord, FieldChanges, TargetField};
pub use resolver::backfill_row;
pub use summary::RunSummary;
pub use table::{Table, TableError};
