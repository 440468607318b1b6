//! Identity resolution: free-text name → Wikidata QID via Wikipedia search.
//!
//! For each configured language edition: full-text search with a single
//! result, then the top hit's `pageprops.wikibase_item`. When the configured
//! order yields nothing, the reversed order gets one more pass. That pass
//! repeats every search already made when the first pass tried all editions;
//! it is kept as a best-effort second chance.

use std::sync::Arc;

use backfill_core::{HttpClient, Pacer};
use serde_json::Value;

use crate::cache::{CacheStats, LookupCache};
use crate::config::ProvidersConfig;
use crate::{Lookup, ProviderError};

pub struct WikipediaResolver {
    http: Arc<HttpClient>,
    api_template: String,
    langs: Vec<String>,
    pacer: Pacer,
    cache: LookupCache<String>,
}

impl WikipediaResolver {
    pub fn new(http: Arc<HttpClient>, config: &ProvidersConfig, pacer: Pacer) -> Self {
        Self {
            http,
            api_template: config.wikipedia_api.clone(),
            langs: config.wikipedia_langs.clone(),
            pacer,
            cache: LookupCache::new(),
        }
    }

    /// Resolve `name` trying exactly `langs`, in order. Cached per `name|langs`.
    pub fn lookup_in(
        &mut self,
        name: &str,
        langs: &[String],
    ) -> Result<Option<String>, ProviderError> {
        let key = format!("{name}|{}", langs.join("-"));
        let Self {
            ref http,
            ref api_template,
            ref pacer,
            ref mut cache,
            ..
        } = *self;
        cache.get_or_try_fetch(&key, || fetch_qid(http, api_template, pacer, name, langs))
    }
}

impl Lookup for WikipediaResolver {
    type Output = String;

    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn lookup(&mut self, name: &str) -> Result<Option<String>, ProviderError> {
        let langs = self.langs.clone();
        if let Some(qid) = self.lookup_in(name, &langs)? {
            return Ok(Some(qid));
        }
        let reversed: Vec<String> = langs.into_iter().rev().collect();
        self.lookup_in(name, &reversed)
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn api_url(template: &str, lang: &str) -> String {
    template.replace("{lang}", lang)
}

fn fetch_qid(
    http: &HttpClient,
    api_template: &str,
    pacer: &Pacer,
    name: &str,
    langs: &[String],
) -> Result<Option<String>, ProviderError> {
    let options = http.request_options();
    for lang in langs {
        let url = api_url(api_template, lang);
        let search = http.get_json(
            &url,
            &[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", name),
                ("srlimit", "1"),
                ("format", "json"),
            ],
            &[],
            options,
        )?;
        pacer.pause();

        let Some(title) = top_hit_title(&search) else {
            log::debug!("wikipedia/{lang}: no hit for {name:?}");
            continue;
        };
        let pages = http.get_json(
            &url,
            &[
                ("action", "query"),
                ("titles", title),
                ("prop", "pageprops"),
                ("format", "json"),
            ],
            &[],
            options,
        )?;
        pacer.pause();

        if let Some(qid) = wikibase_item(&pages) {
            log::debug!("wikipedia/{lang}: {name:?} -> {title:?} -> {qid}");
            return Ok(Some(qid));
        }
    }
    Ok(None)
}

fn top_hit_title(search: &Value) -> Option<&str> {
    search
        .pointer("/query/search/0/title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}

fn wikibase_item(pages: &Value) -> Option<String> {
    pages
        .pointer("/query/pages")?
        .as_object()?
        .values()
        .find_map(|page| page.pointer("/pageprops/wikibase_item")?.as_str())
        .filter(|qid| !qid.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_hit_from_search() {
        let body = json!({"query": {"search": [{"title": "Acme Corporation", "pageid": 7}]}});
        assert_eq!(top_hit_title(&body), Some("Acme Corporation"));
    }

    #[test]
    fn no_hits() {
        assert_eq!(top_hit_title(&json!({"query": {"search": []}})), None);
        assert_eq!(top_hit_title(&json!({})), None);
    }

    #[test]
    fn qid_from_pageprops() {
        let body = json!({"query": {"pages": {"123": {"pageprops": {"wikibase_item": "Q42"}}}}});
        assert_eq!(wikibase_item(&body).as_deref(), Some("Q42"));
    }

    #[test]
    fn page_without_pageprops() {
        let body = json!({"query": {"pages": {"-1": {"missing": ""}}}});
        assert_eq!(wikibase_item(&body), None);
    }

    #[test]
    fn url_template_substitutes_lang() {
        assert_eq!(
            api_url("https://{lang}.wikipedia.org/w/api.php", "fr"),
            "https://fr.wikipedia.org/w/api.php"
        );
    }
}
