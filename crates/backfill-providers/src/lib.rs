//! Backfill Providers - adapters for the external data sources
//!
//! Each adapter wraps the shared [`HttpClient`] with one provider's request
//! shape and response parsing, and memoizes answers (including "not found")
//! for the lifetime of the run that constructed it.

pub mod cache;
pub mod clearbit;
pub mod config;
pub mod opencorporates;
pub mod wikidata;
pub mod wikipedia;

use std::sync::Arc;

use backfill_core::{HttpClient, HttpError, Pacer};

pub use cache::{CacheStats, LookupCache};
pub use clearbit::ClearbitDomains;
pub use config::ProvidersConfig;
pub use opencorporates::{OpenCorporatesRegistry, jurisdiction_country};
pub use wikidata::{EntityProps, WikidataClient, is_valid_qid};
pub use wikipedia::WikipediaResolver;

/// Error from a provider lookup
#[derive(Debug)]
pub enum ProviderError {
    Http(HttpError),
    /// Identifier rejected before it reached a query template
    InvalidIdentifier(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "{e}"),
            Self::InvalidIdentifier(id) => write!(f, "invalid identifier: {id:?}"),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::InvalidIdentifier(_) => None,
        }
    }
}

impl From<HttpError> for ProviderError {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

/// One provider capability: query in, optional answer out.
///
/// `Ok(None)` is a legitimate "no match", not an error.
pub trait Lookup {
    type Output;

    /// Short provider name for logs and summaries
    fn name(&self) -> &'static str;

    fn lookup(&mut self, query: &str) -> Result<Option<Self::Output>, ProviderError>;

    fn cache_stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

/// The four adapters a run resolves rows against, in priority order.
pub struct ProviderSet {
    /// Name → canonical identifier
    pub identity: Box<dyn Lookup<Output = String>>,
    /// Identifier → structured attributes
    pub attributes: Box<dyn Lookup<Output = EntityProps>>,
    /// Name → `https://<domain>`
    pub domain: Box<dyn Lookup<Output = String>>,
    /// Name → country of registration
    pub registry: Box<dyn Lookup<Output = String>>,
}

impl ProviderSet {
    /// Live adapters with cold caches, sharing one client and pacer.
    pub fn live(http: Arc<HttpClient>, config: &ProvidersConfig, pacer: Pacer) -> Self {
        Self {
            identity: Box::new(WikipediaResolver::new(http.clone(), config, pacer.clone())),
            attributes: Box::new(WikidataClient::new(http.clone(), config, pacer.clone())),
            domain: Box::new(ClearbitDomains::new(http.clone(), config, pacer.clone())),
            registry: Box::new(OpenCorporatesRegistry::new(http, config, pacer)),
        }
    }

    /// Cache counters per provider, in resolution order
    pub fn cache_report(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            (self.identity.name(), self.identity.cache_stats()),
            (self.attributes.name(), self.attributes.cache_stats()),
            (self.domain.name(), self.domain.cache_stats()),
            (self.registry.name(), self.registry.cache_stats()),
        ]
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet")
            .field("identity", &self.identity.name())
            .field("attributes", &self.attributes.name())
            .field("domain", &self.domain.name())
            .field("registry", &self.registry.name())
            .finish()
    }
}
