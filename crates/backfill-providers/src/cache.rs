//! Per-run memo of provider answers, negative answers included

use std::collections::HashMap;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from memory
    pub hits: usize,
    /// Lookups that went to the network
    pub misses: usize,
    /// Stored keys (positive and negative)
    pub entries: usize,
}

/// Key → `Some(value)` or `None` ("provider said no").
///
/// Errors are never stored, so a key whose fetch failed is tried again the
/// next time it is requested.
#[derive(Debug)]
pub struct LookupCache<V> {
    entries: HashMap<String, Option<V>>,
    hits: usize,
    misses: usize,
}

impl<V> Default for LookupCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V: Clone> LookupCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored answer for `key`, or run `fetch` once and store its answer.
    pub fn get_or_try_fetch<E>(
        &mut self,
        key: &str,
        fetch: impl FnOnce() -> Result<Option<V>, E>,
    ) -> Result<Option<V>, E> {
        if let Some(stored) = self.entries.get(key) {
            self.hits += 1;
            return Ok(stored.clone());
        }
        self.misses += 1;
        let value = fetch()?;
        self.entries.insert(key.to_string(), value.clone());
        Ok(value)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lookup_is_a_hit() {
        let mut cache = LookupCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_try_fetch::<()>("acme", || {
                    calls += 1;
                    Ok(Some("Q1".to_string()))
                })
                .unwrap();
            assert_eq!(value.as_deref(), Some("Q1"));
        }
        assert_eq!(calls, 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn negative_answer_is_stored() {
        let mut cache: LookupCache<String> = LookupCache::new();
        let mut calls = 0;
        for _ in 0..2 {
            let value = cache
                .get_or_try_fetch::<()>("nobody", || {
                    calls += 1;
                    Ok(None)
                })
                .unwrap();
            assert!(value.is_none());
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn errors_are_not_stored() {
        let mut cache: LookupCache<String> = LookupCache::new();
        let first = cache.get_or_try_fetch("flaky", || Err("boom"));
        assert_eq!(first, Err("boom"));
        assert_eq!(cache.stats().entries, 0);

        let second = cache
            .get_or_try_fetch::<&str>("flaky", || Ok(Some("ok".to_string())))
            .unwrap();
        assert_eq!(second.as_deref(), Some("ok"));
        assert_eq!(cache.stats().misses, 2);
    }
}
