//! Website guess from a company name via Clearbit autocomplete

use std::sync::Arc;

use backfill_core::{HttpClient, Pacer};
use serde_json::Value;

use crate::cache::{CacheStats, LookupCache};
use crate::config::ProvidersConfig;
use crate::{Lookup, ProviderError};

pub struct ClearbitDomains {
    http: Arc<HttpClient>,
    suggest_url: String,
    pacer: Pacer,
    cache: LookupCache<String>,
}

impl ClearbitDomains {
    pub fn new(http: Arc<HttpClient>, config: &ProvidersConfig, pacer: Pacer) -> Self {
        Self {
            http,
            suggest_url: config.clearbit_suggest.clone(),
            pacer,
            cache: LookupCache::new(),
        }
    }
}

impl Lookup for ClearbitDomains {
    type Output = String;

    fn name(&self) -> &'static str {
        "clearbit"
    }

    fn lookup(&mut self, name: &str) -> Result<Option<String>, ProviderError> {
        let Self {
            ref http,
            ref suggest_url,
            ref pacer,
            ref mut cache,
        } = *self;
        cache.get_or_try_fetch::<ProviderError>(name, || {
            let body = http.get_json(suggest_url, &[("query", name)], &[], http.request_options())?;
            pacer.pause();
            Ok(top_domain(&body).map(|domain| format!("https://{domain}")))
        })
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// `domain` of the first suggestion, if the response is a non-empty array
fn top_domain(body: &Value) -> Option<&str> {
    body.as_array()?
        .first()?
        .get("domain")?
        .as_str()
        .map(str::trim)
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_suggestion_wins() {
        let body = json!([
            {"name": "Acme", "domain": "acme.example", "logo": null},
            {"name": "Acme Labs", "domain": "acmelabs.example"}
        ]);
        assert_eq!(top_domain(&body), Some("acme.example"));
    }

    #[test]
    fn empty_or_malformed() {
        assert_eq!(top_domain(&json!([])), None);
        assert_eq!(top_domain(&json!({"error": "rate"})), None);
        assert_eq!(top_domain(&json!([{"name": "No Domain"}])), None);
        assert_eq!(top_domain(&json!([{"domain": "  "}])), None);
    }
}
