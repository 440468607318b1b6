//! Scripted providers for unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use backfill_core::HttpError;
use backfill_providers::{CacheStats, EntityProps, Lookup, ProviderError, ProviderSet};

#[derive(Clone)]
pub enum Answer<V> {
    Found(V),
    Fail(u16),
}

/// Shared log of the queries a [`Scripted`] provider received
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn list(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Answers from a fixed table; unknown queries are "not found".
pub struct Scripted<V> {
    name: &'static str,
    answers: HashMap<String, Answer<V>>,
    calls: Calls,
}

impl<V> Scripted<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            answers: HashMap::new(),
            calls: Calls::default(),
        }
    }

    pub fn answer(mut self, query: &str, answer: Answer<V>) -> Self {
        self.answers.insert(query.to_string(), answer);
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }
}

impl<V: Clone> Lookup for Scripted<V> {
    type Output = V;

    fn name(&self) -> &'static str {
        self.name
    }

    fn lookup(&mut self, query: &str) -> Result<Option<V>, ProviderError> {
        self.calls.0.lock().unwrap().push(query.to_string());
        match self.answers.get(query) {
            Some(Answer::Found(v)) => Ok(Some(v.clone())),
            Some(Answer::Fail(status)) => Err(HttpError::Status {
                url: format!("https://{}.test/?q={query}", self.name),
                status: *status,
            }
            .into()),
            None => Ok(None),
        }
    }

    fn cache_stats(&self) -> CacheStats {
        CacheStats {
            misses: self.calls.list().len(),
            ..Default::default()
        }
    }
}

pub fn provider_set(
    identity: Scripted<String>,
    attributes: Scripted<EntityProps>,
    domain: Scripted<String>,
    registry: Scripted<String>,
) -> ProviderSet {
    ProviderSet {
        identity: Box::new(identity),
        attributes: Box::new(attributes),
        domain: Box::new(domain),
        registry: Box::new(registry),
    }
}

/// Set whose providers never find anything
pub fn empty_set() -> ProviderSet {
    provider_set(
        Scripted::new("ids"),
        Scripted::new("attrs"),
        Scripted::new("domain"),
        Scripted::new("registry"),
    )
}
