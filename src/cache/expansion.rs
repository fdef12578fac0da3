//! In-process memo of collaborator term expansions.
//!
//! Strategy: remember every successful `expand(term)` answer, keyed by the
//! exact term string, for the lifetime of the process. Expansion calls are
//! slow (an LLM round trip) while the vocabulary is small: ontology labels
//! plus corpus keywords.
//!
//! Cache structure:
//! - Key: the term, verbatim (no case folding or trimming)
//! - Value: the ordered expansion list
//! - No eviction, no TTL
//!
//! Failed expansions are not stored, so a later request can retry them.
//! DashMap shards the map, so concurrent requests can read and insert
//! without a global lock. Each key holds a `OnceCell`: concurrent misses on
//! the same term wait for a single `expand` call instead of racing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::CollaboratorError;

/// Concurrency-safe expansion cache, shared between scoring engines via `Arc`.
#[derive(Debug, Default)]
pub struct ExpansionCache {
    entries: DashMap<String, Arc<OnceCell<Vec<String>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ExpansionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached expansions for `term`, if present. Does not touch the counters.
    pub fn get(&self, term: &str) -> Option<Vec<String>> {
        self.entries
            .get(term)
            .and_then(|entry| entry.value().get().cloned())
    }

    /// Store expansions for `term`. An existing entry wins; the cache never
    /// changes an answer it has already handed out.
    pub fn insert(&self, term: &str, expansions: Vec<String>) -> Vec<String> {
        self.cell(term).get_or_init(|| expansions).clone()
    }

    /// Return the cached expansions for `term`, calling `expand` on a miss.
    ///
    /// Concurrent callers missing on the same term block until the first
    /// `expand` finishes. A failing `expand` degrades to an empty list and
    /// leaves the cell empty, so the next caller retries.
    pub fn get_or_expand<F>(&self, term: &str, expand: F) -> Vec<String>
    where
        F: FnOnce(&str) -> Result<Vec<String>, CollaboratorError>,
    {
        let cell = self.cell(term);
        let mut called = false;
        let result = cell.get_or_try_init(|| {
            called = true;
            expand(term)
        });

        if called {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        match result {
            Ok(expansions) => {
                if called {
                    debug!(term, count = expansions.len(), "cached expansion");
                }
                expansions.clone()
            }
            Err(err) => {
                warn!(term, error = %err, "term expansion failed");
                Vec::new()
            }
        }
    }

    /// The cell for `term`, created empty on first sight. The map guard is
    /// released before the caller blocks on the cell.
    fn cell(&self, term: &str) -> Arc<OnceCell<Vec<String>>> {
        Arc::clone(self.entries.entry(term.to_string()).or_default().value())
    }

    /// Number of terms with a cached answer.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cache statistics for monitoring and debugging.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached terms
    pub entries: usize,
    pub hits: usize,
    /// Lookups that had to ask the collaborator (including failed ones)
    pub misses: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::time::Duration;

    #[test]
    fn test_second_lookup_skips_expand() {
        let cache = ExpansionCache::new();
        let calls = Cell::new(0);
        let expand = |_: &str| {
            calls.set(calls.get() + 1);
            Ok(vec!["branding".to_string(), "pricing".to_string()])
        };

        let first = cache.get_or_expand("marketing", expand);
        let second = cache.get_or_expand("marketing", expand);

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.stats(), CacheStats { entries: 1, hits: 1, misses: 1 });
    }

    #[test]
    fn test_keys_are_exact() {
        let cache = ExpansionCache::new();
        cache.insert("Marketing", vec!["a".into()]);
        assert!(cache.get("marketing").is_none());
        assert!(cache.get("Marketing ").is_none());
    }

    #[test]
    fn test_failures_degrade_and_are_not_cached() {
        let cache = ExpansionCache::new();
        let failed = cache.get_or_expand("marketing", |_| Err(CollaboratorError::EmptyResponse));
        assert!(failed.is_empty());
        assert!(cache.is_empty());

        let retried = cache.get_or_expand("marketing", |_| Ok(vec!["branding".into()]));
        assert_eq!(retried, vec!["branding".to_string()]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = ExpansionCache::new();
        cache.insert("t", vec!["one".into()]);
        let kept = cache.insert("t", vec!["two".into()]);
        assert_eq!(kept, vec!["one".to_string()]);
    }

    #[test]
    fn test_concurrent_inserts() {
        let cache = Arc::new(ExpansionCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let term = format!("term-{}", i % 4);
                    cache.get_or_expand(&term, |t| Ok(vec![format!("{t}-x")]))
                })
            })
            .collect();
        for handle in handles {
            let result = handle.join().unwrap();
            assert_eq!(result.len(), 1);
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_concurrent_misses_share_one_expand() {
        let cache = Arc::new(ExpansionCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_expand("marketing", |_| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(50));
                        Ok(vec!["branding".to_string()])
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec!["branding".to_string()]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats(), CacheStats { entries: 1, hits: 3, misses: 1 });
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
        let stats = CacheStats { entries: 1, hits: 3, misses: 1 };
        assert!((stats.hit_rate() - 0.75).abs() < 1e-9);
    }
}
