//! Structured attributes for a Wikidata QID via the SPARQL endpoint

use std::sync::Arc;
use std::time::Duration;

use backfill_core::{HttpClient, Pacer};
use serde_json::Value;

use crate::cache::{CacheStats, LookupCache};
use crate::config::ProvidersConfig;
use crate::{Lookup, ProviderError};

/// Attributes projected from one Wikidata entity. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityProps {
    pub country: Option<String>,
    pub industry: Option<String>,
    pub hq_location: Option<String>,
    pub inception: Option<String>,
    pub website: Option<String>,
}

impl EntityProps {
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_none())
    }

    /// `(column, value)` pairs, column names matching the enrichment table
    pub fn fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("country", self.country.as_deref()),
            ("industry", self.industry.as_deref()),
            ("hq_location", self.hq_location.as_deref()),
            ("inception", self.inception.as_deref()),
            ("website", self.website.as_deref()),
        ]
    }
}

/// `Q` followed by at least one digit, nothing else
pub fn is_valid_qid(qid: &str) -> bool {
    qid.strip_prefix('Q')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Single-row projection over P17/P452/P159/P571/P856, labels in `label_languages`.
///
/// Callers must pass a QID that satisfies [`is_valid_qid`].
fn build_query(qid: &str, label_languages: &str) -> String {
    format!(
        r#"SELECT ?countryLabel ?industryLabel ?hqLabel ?inception ?website WHERE {{
  VALUES ?c {{ wd:{qid} }}
  OPTIONAL {{ ?c wdt:P17  ?country.   }}
  OPTIONAL {{ ?c wdt:P452 ?industry.  }}
  OPTIONAL {{ ?c wdt:P159 ?hq.        }}
  OPTIONAL {{ ?c wdt:P571 ?inception. }}
  OPTIONAL {{ ?c wdt:P856 ?website.   }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "{label_languages}". }}
}}
LIMIT 1"#
    )
}

pub struct WikidataClient {
    http: Arc<HttpClient>,
    sparql_url: String,
    timeout: Duration,
    label_languages: String,
    pacer: Pacer,
    cache: LookupCache<EntityProps>,
}

impl WikidataClient {
    pub fn new(http: Arc<HttpClient>, config: &ProvidersConfig, pacer: Pacer) -> Self {
        Self {
            http,
            sparql_url: config.wikidata_sparql.clone(),
            timeout: config.sparql_timeout,
            label_languages: config.label_languages.clone(),
            pacer,
            cache: LookupCache::new(),
        }
    }
}

impl Lookup for WikidataClient {
    type Output = EntityProps;

    fn name(&self) -> &'static str {
        "wikidata"
    }

    fn lookup(&mut self, qid: &str) -> Result<Option<EntityProps>, ProviderError> {
        let qid = qid.trim();
        if !is_valid_qid(qid) {
            return Err(ProviderError::InvalidIdentifier(qid.to_string()));
        }
        let Self {
            ref http,
            ref sparql_url,
            timeout,
            ref label_languages,
            ref pacer,
            ref mut cache,
        } = *self;
        cache.get_or_try_fetch::<ProviderError>(qid, || {
            let query = build_query(qid, label_languages);
            let body = http.get_json(
                sparql_url,
                &[("query", query.as_str())],
                &[("Accept", "application/sparql-results+json")],
                http.request_options().with_timeout(timeout),
            )?;
            pacer.pause();
            Ok(parse_bindings(&body))
        })
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// First result row → props; no rows → `None`
fn parse_bindings(body: &Value) -> Option<EntityProps> {
    let row = body.pointer("/results/bindings/0")?;
    let value = |key: &str| {
        row.get(key)?
            .get("value")?
            .as_str()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    Some(EntityProps {
        country: value("countryLabel"),
        industry: value("industryLabel"),
        hq_location: value("hqLabel"),
        inception: value("inception"),
        website: value("website"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn qid_validation() {
        assert!(is_valid_qid("Q42"));
        assert!(is_valid_qid("Q123456789"));
        assert!(!is_valid_qid("Q"));
        assert!(!is_valid_qid("q42"));
        assert!(!is_valid_qid("P17"));
        assert!(!is_valid_qid("Q42 } UNION { ?s ?p ?o"));
        assert!(!is_valid_qid(""));
    }

    #[test]
    fn query_embeds_qid_and_labels() {
        let q = build_query("Q95", "en,fr");
        assert!(q.contains("VALUES ?c { wd:Q95 }"));
        assert!(q.contains("wikibase:language \"en,fr\""));
        assert!(q.contains("wdt:P856"));
    }

    #[test]
    fn parse_full_row() {
        let body = json!({"results": {"bindings": [{
            "countryLabel": {"type": "literal", "value": "France"},
            "industryLabel": {"type": "literal", "value": "retail"},
            "hqLabel": {"type": "literal", "value": "Paris"},
            "inception": {"type": "literal", "value": "1959-01-01T00:00:00Z"},
            "website": {"type": "uri", "value": "https://www.example.fr/"}
        }]}});
        let props = parse_bindings(&body).unwrap();
        assert_eq!(props.country.as_deref(), Some("France"));
        assert_eq!(props.hq_location.as_deref(), Some("Paris"));
        assert_eq!(props.inception.as_deref(), Some("1959-01-01T00:00:00Z"));
        assert_eq!(props.website.as_deref(), Some("https://www.example.fr/"));
    }

    #[test]
    fn parse_partial_row() {
        let body = json!({"results": {"bindings": [{
            "countryLabel": {"type": "literal", "value": "Japan"}
        }]}});
        let props = parse_bindings(&body).unwrap();
        assert_eq!(props.country.as_deref(), Some("Japan"));
        assert!(props.website.is_none());
        assert!(!props.is_empty());
    }

    #[test]
    fn parse_no_rows() {
        assert!(parse_bindings(&json!({"results": {"bindings": []}})).is_none());
    }

    #[test]
    fn empty_props() {
        assert!(EntityProps::default().is_empty());
    }
}
