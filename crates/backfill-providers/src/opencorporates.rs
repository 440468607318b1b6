//! Country of registration from the OpenCorporates company search

use std::sync::Arc;

use backfill_core::{HttpClient, Pacer};
use serde_json::Value;

use crate::cache::{CacheStats, LookupCache};
use crate::config::ProvidersConfig;
use crate::{Lookup, ProviderError};

/// Jurisdiction prefix (first two characters of `jurisdiction_code`) → country name.
/// Sorted by code.
const JURISDICTIONS: &[(&str, &str)] = &[
    ("ae", "United Arab Emirates"),
    ("at", "Austria"),
    ("au", "Australia"),
    ("be", "Belgium"),
    ("bm", "Bermuda"),
    ("br", "Brazil"),
    ("ca", "Canada"),
    ("ch", "Switzerland"),
    ("cn", "China"),
    ("cy", "Cyprus"),
    ("de", "Germany"),
    ("dk", "Denmark"),
    ("es", "Spain"),
    ("fi", "Finland"),
    ("fr", "France"),
    ("gb", "United Kingdom"),
    ("gg", "Guernsey"),
    ("gi", "Gibraltar"),
    ("hk", "Hong Kong"),
    ("ie", "Ireland"),
    ("il", "Israel"),
    ("im", "Isle of Man"),
    ("in", "India"),
    ("it", "Italy"),
    ("je", "Jersey"),
    ("jp", "Japan"),
    ("kr", "South Korea"),
    ("ky", "Cayman Islands"),
    ("lu", "Luxembourg"),
    ("mt", "Malta"),
    ("mx", "Mexico"),
    ("my", "Malaysia"),
    ("nl", "Netherlands"),
    ("no", "Norway"),
    ("nz", "New Zealand"),
    ("pl", "Poland"),
    ("pt", "Portugal"),
    ("ro", "Romania"),
    ("ru", "Russia"),
    ("se", "Sweden"),
    ("sg", "Singapore"),
    ("us", "United States"),
    ("vg", "British Virgin Islands"),
    ("za", "South Africa"),
];

/// Country for a jurisdiction code such as `us_de` or `gb`
pub fn jurisdiction_country(code: &str) -> Option<&'static str> {
    let prefix = code.get(..2)?.to_ascii_lowercase();
    JURISDICTIONS
        .binary_search_by(|(c, _)| (*c).cmp(prefix.as_str()))
        .ok()
        .map(|idx| JURISDICTIONS[idx].1)
}

pub struct OpenCorporatesRegistry {
    http: Arc<HttpClient>,
    search_url: String,
    api_token: Option<String>,
    pacer: Pacer,
    cache: LookupCache<String>,
}

impl OpenCorporatesRegistry {
    pub fn new(http: Arc<HttpClient>, config: &ProvidersConfig, pacer: Pacer) -> Self {
        Self {
            http,
            search_url: config.opencorporates_search.clone(),
            api_token: config.opencorporates_token.clone(),
            pacer,
            cache: LookupCache::new(),
        }
    }
}

impl Lookup for OpenCorporatesRegistry {
    type Output = String;

    fn name(&self) -> &'static str {
        "opencorporates"
    }

    fn lookup(&mut self, name: &str) -> Result<Option<String>, ProviderError> {
        let Self {
            ref http,
            ref search_url,
            ref api_token,
            ref pacer,
            ref mut cache,
        } = *self;
        cache.get_or_try_fetch::<ProviderError>(name, || {
            let mut query = vec![("q", name), ("per_page", "1")];
            if let Some(token) = api_token {
                query.push(("api_token", token.as_str()));
            }
            let body = http.get_json(search_url, &query, &[], http.request_options())?;
            pacer.pause();
            Ok(company_country(&body))
        })
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Jurisdiction table first, then the registered address
fn company_country(body: &Value) -> Option<String> {
    let company = body.pointer("/results/companies/0/company")?;
    let from_jurisdiction = company
        .get("jurisdiction_code")
        .and_then(Value::as_str)
        .and_then(jurisdiction_country);
    if let Some(country) = from_jurisdiction {
        return Some(country.to_string());
    }
    company
        .pointer("/registered_address/country")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
