//! Run statistics and their rendering.

use std::time::Duration;

use backfill_core::fmt_num;
use backfill_providers::CacheStats;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Rows in the table
    pub total_rows: usize,
    /// Rows picked for processing
    pub selected: usize,
    /// Selected rows actually visited (less than `selected` when interrupted)
    pub processed: usize,
    /// Rows that received at least one new value
    pub updated: usize,
    /// Rows resolved without error but with nothing new
    pub unchanged: usize,
    /// Rows whose resolution failed
    pub errored: usize,
    pub checkpoints_written: usize,
    pub checkpoint_failures: usize,
    pub interrupted: bool,
    pub elapsed: Duration,
    /// Cache counters per provider, in resolution order
    pub providers: Vec<(&'static str, CacheStats)>,
}

impl RunSummary {
    /// `Rows updated: X / Y` where Y counts the selected rows
    pub fn headline(&self) -> String {
        format!(
            "Rows updated: {} / {}",
            fmt_num(self.updated),
            fmt_num(self.selected)
        )
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Enrichment")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);

        table.add_row(vec![
            Cell::new("Rows selected"),
            Cell::new(format!(
                "{} of {}",
                fmt_num(self.selected),
                fmt_num(self.total_rows)
            )),
        ]);
        table.add_row(vec![
            Cell::new("Processed"),
            Cell::new(fmt_num(self.processed)),
        ]);
        table.add_row(vec![
            Cell::new("Updated").fg(Color::Green),
            Cell::new(fmt_num(self.updated)).fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("Unchanged"),
            Cell::new(fmt_num(self.unchanged)),
        ]);
        let errored = Cell::new(fmt_num(self.errored));
        table.add_row(vec![
            Cell::new("Errored"),
            if self.errored > 0 {
                errored.fg(Color::Red)
            } else {
                errored
            },
        ]);
        table.add_row(vec![
            Cell::new("Checkpoints"),
            Cell::new(format!(
                "{} ({} failed)",
                self.checkpoints_written, self.checkpoint_failures
            )),
        ]);
        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.1}s", self.elapsed.as_secs_f64())),
        ]);

        let mut out = format!("\n{table}");

        if !self.providers.is_empty() {
            let mut cache = Table::new();
            cache
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Provider").fg(Color::Cyan),
                    Cell::new("Calls").fg(Color::Cyan),
                    Cell::new("Cache hits").fg(Color::Cyan),
                    Cell::new("Keys").fg(Color::Cyan),
                ]);
            for (name, stats) in &self.providers {
                cache.add_row(vec![
                    Cell::new(name),
                    Cell::new(fmt_num(stats.misses)),
                    Cell::new(fmt_num(stats.hits)),
                    Cell::new(fmt_num(stats.entries)),
                ]);
            }
            out.push_str(&format!("\n{cache}"));
        }

        if self.interrupted {
            out.push_str("\n  Interrupted: partial results saved to the checkpoint");
        }
        out
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "{} ({} unchanged, {} errored{}) [{:.1}s]",
            self.headline(),
            fmt_num(self.unchanged),
            fmt_num(self.errored),
            if self.interrupted { ", interrupted" } else { "" },
            self.elapsed.as_secs_f64()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_counts_selected_rows() {
        let summary = RunSummary {
            total_rows: 5000,
            selected: 1200,
            updated: 1001,
            ..Default::default()
        };
        assert_eq!(summary.headline(), "Rows updated: 1,001 / 1,200");
    }

    #[test]
    fn table_lists_providers() {
        let summary = RunSummary {
            providers: vec![(
                "wikipedia",
                CacheStats {
                    hits: 3,
                    misses: 7,
                    entries: 7,
                },
            )],
            interrupted: true,
            ..Default::default()
        };
        let text = summary.format_table();
        assert!(text.contains("wikipedia"));
        assert!(text.contains("Interrupted"));
    }
}
