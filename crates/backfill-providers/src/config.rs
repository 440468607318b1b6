//! Provider endpoints and pacing

use std::time::Duration;

/// Politeness pause after each successful provider request
pub const REQUEST_PAUSE: Duration = Duration::from_millis(200);

/// The SPARQL endpoint is slower than the REST APIs
pub const SPARQL_TIMEOUT: Duration = Duration::from_secs(25);

/// Runtime configuration shared by the adapters
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    /// MediaWiki API URL with a `{lang}` placeholder
    pub wikipedia_api: String,
    /// Wikipedia editions searched in order; reversed on the second pass
    pub wikipedia_langs: Vec<String>,
    pub wikidata_sparql: String,
    /// Per-request timeout for SPARQL queries, separate from the client default
    pub sparql_timeout: Duration,
    /// Language preference for Wikidata labels, e.g. `en,fr`
    pub label_languages: String,
    pub clearbit_suggest: String,
    pub opencorporates_search: String,
    pub opencorporates_token: Option<String>,
    pub request_pause: Duration,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            wikipedia_api: "https://{lang}.wikipedia.org/w/api.php".to_string(),
            wikipedia_langs: vec!["en".to_string(), "fr".to_string()],
            wikidata_sparql: "https://query.wikidata.org/sparql".to_string(),
            sparql_timeout: SPARQL_TIMEOUT,
            label_languages: "en,fr".to_string(),
            clearbit_suggest: "https://autocomplete.clearbit.com/v1/companies/suggest".to_string(),
            opencorporates_search: "https://api.opencorporates.com/v0.4/companies/search"
                .to_string(),
            opencorporates_token: None,
            request_pause: REQUEST_PAUSE,
        }
    }
}
