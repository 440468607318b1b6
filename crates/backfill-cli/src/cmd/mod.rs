pub mod enrich;
pub mod lookup;

use std::sync::Arc;

use anyhow::{Context, Result};
use backfill_core::{HttpClient, Pacer, Sleeper};
use backfill_providers::ProviderSet;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

/// Live adapters over one shared client, all sleeping through `sleeper`
fn live_providers(config: &Config, sleeper: Arc<dyn Sleeper>) -> Result<ProviderSet> {
    let http = HttpClient::new(&config.http.client_config(), sleeper.clone())
        .context("Failed to build HTTP client")?;
    let providers = config.providers.providers_config();
    let pacer = Pacer::new(sleeper, providers.request_pause);
    Ok(ProviderSet::live(Arc::new(http), &providers, pacer))
}

/// Print a key-value summary table on stderr
fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// `backfill config`: the effective settings after file and env resolution
pub fn show_config(config: &Config) {
    let http = config.http.client_config();
    let providers = config.providers.providers_config();
    let options = config.enrich.options();
    print_summary(
        "Setting",
        &[
            ("User agent", http.user_agent),
            ("Timeout", format!("{}s", http.timeout.as_secs())),
            ("Max attempts", http.max_attempts.to_string()),
            ("Backoff step", format!("{}ms", http.base_delay.as_millis())),
            ("Wikipedia API", providers.wikipedia_api),
            ("Wikipedia langs", providers.wikipedia_langs.join(",")),
            ("Wikidata SPARQL", providers.wikidata_sparql),
            (
                "SPARQL timeout",
                format!("{}s", providers.sparql_timeout.as_secs()),
            ),
            ("Clearbit", providers.clearbit_suggest),
            ("OpenCorporates", providers.opencorporates_search),
            (
                "OpenCorporates token",
                if providers.opencorporates_token.is_some() {
                    "configured".to_string()
                } else {
                    "not set".to_string()
                },
            ),
            (
                "Request pause",
                format!("{}ms", providers.request_pause.as_millis()),
            ),
            ("Name column", options.name_field),
            ("Row delay", format!("{}ms", options.delay.as_millis())),
            (
                "Checkpoint",
                match options.checkpoint_every {
                    Some(n) => format!("every {n} rows → {}", options.checkpoint_path.display()),
                    None => "disabled".to_string(),
                },
            ),
            ("Only missing", options.only_missing.to_string()),
        ],
    );
}
