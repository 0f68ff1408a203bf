//! Bounded lookup cache
//!
//! Fixed capacity with first-in-first-out eviction. Only definitive results
//! (found / not found) are stored; errors are retried on the next lookup.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::ValidationResult;

/// Default number of cached words
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Cache counters reported to operators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub cached_words: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from cache
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
pub struct LookupCache {
    entries: FxHashMap<String, ValidationResult>,
    order: VecDeque<String>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl LookupCache {
    /// A capacity of zero disables caching
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            order: VecDeque::new(),
            capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Fetch a cached result, updating hit/miss counters
    pub fn get(&mut self, word: &str) -> Option<ValidationResult> {
        if let Some(result) = self.entries.get(word) {
            self.hits += 1;
            Some(result.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    /// Store a result if it is definitive
    pub fn insert(&mut self, result: &ValidationResult) {
        if self.capacity == 0 || !result.status.is_definitive() {
            return;
        }

        if self.entries.contains_key(&result.word) {
            self.entries.insert(result.word.clone(), result.clone());
            return;
        }

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.evictions += 1;
        }

        self.order.push_back(result.word.clone());
        self.entries.insert(result.word.clone(), result.clone());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cached_words: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
