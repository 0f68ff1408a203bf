//! Filtered reads over the collection
//!
//! All predicates are ANDed. `exact_length` replaces the min/max length checks
//! entirely. Results are the first `limit` matches in collection order, not a
//! ranked top-k.

use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;

use super::EngineError;
use crate::core::{Word, WordPattern};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;

/// Valid range for length lookups and pattern queries
pub const MIN_WORD_LENGTH: usize = 1;
pub const MAX_WORD_LENGTH: usize = 50;

/// Pattern query results are capped to keep responses small
pub const PATTERN_RESULT_CAP: usize = 500;

/// Collections larger than this are scanned on the rayon pool
const PARALLEL_THRESHOLD: usize = 20_000;

const fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Filter criteria for `WordEngine::query`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WordQuery {
    #[serde(default)]
    pub contains: Option<String>,
    #[serde(default)]
    pub starts_with: Option<String>,
    #[serde(default)]
    pub ends_with: Option<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub exact_length: Option<usize>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for WordQuery {
    fn default() -> Self {
        Self {
            contains: None,
            starts_with: None,
            ends_with: None,
            min_length: None,
            max_length: None,
            exact_length: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl WordQuery {
    #[must_use]
    pub fn contains(mut self, term: impl Into<String>) -> Self {
        self.contains = Some(term.into());
        self
    }

    #[must_use]
    pub fn starts_with(mut self, term: impl Into<String>) -> Self {
        self.starts_with = Some(term.into());
        self
    }

    #[must_use]
    pub fn ends_with(mut self, term: impl Into<String>) -> Self {
        self.ends_with = Some(term.into());
        self
    }

    #[must_use]
    pub const fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    #[must_use]
    pub const fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    #[must_use]
    pub const fn exact_length(mut self, len: usize) -> Self {
        self.exact_length = Some(len);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Check bounds on the numeric parameters
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidQuery` if `limit` is outside 1..=1000 or a
    /// length bound is zero.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(EngineError::InvalidQuery(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {}",
                self.limit
            )));
        }
        for (name, value) in [
            ("min_length", self.min_length),
            ("max_length", self.max_length),
            ("exact_length", self.exact_length),
        ] {
            if value == Some(0) {
                return Err(EngineError::InvalidQuery(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    /// Lowercase the terms once and drop empty ones
    fn compile(&self) -> CompiledQuery {
        let term = |t: &Option<String>| {
            t.as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase)
        };
        let (min_length, max_length) = if self.exact_length.is_some() {
            (None, None)
        } else {
            (self.min_length, self.max_length)
        };

        CompiledQuery {
            contains: term(&self.contains),
            starts_with: term(&self.starts_with),
            ends_with: term(&self.ends_with),
            exact_length: self.exact_length,
            min_length,
            max_length,
        }
    }
}

#[derive(Debug)]
struct CompiledQuery {
    contains: Option<String>,
    starts_with: Option<String>,
    ends_with: Option<String>,
    exact_length: Option<usize>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl CompiledQuery {
    fn matches(&self, word: &Word) -> bool {
        let text = word.text();
        let len = word.len();

        self.contains.as_deref().is_none_or(|t| text.contains(t))
            && self.starts_with.as_deref().is_none_or(|t| text.starts_with(t))
            && self.ends_with.as_deref().is_none_or(|t| text.ends_with(t))
            && self.exact_length.is_none_or(|n| len == n)
            && self.min_length.is_none_or(|n| len >= n)
            && self.max_length.is_none_or(|n| len <= n)
    }
}

/// Apply a query to words in collection order
#[must_use]
pub fn filter_words(words: &[Word], query: &WordQuery) -> Vec<String> {
    let compiled = query.compile();
    take_matching(words, query.limit, |word| compiled.matches(word))
}

/// Words of exactly `length` characters
#[must_use]
pub fn words_of_length(words: &[Word], length: usize) -> Vec<String> {
    take_matching(words, usize::MAX, |word| word.len() == length)
}

/// Fixed-length wildcard match
///
/// A `length` outside 1..=50 yields no results rather than an error.
#[must_use]
pub fn match_pattern(words: &[Word], length: usize, pattern: &str) -> Vec<String> {
    if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&length) {
        return Vec::new();
    }

    let pattern = WordPattern::parse(pattern);
    if pattern.len() != length {
        debug!(
            pattern_len = pattern.len(),
            length, "pattern length differs from requested length"
        );
    }

    take_matching(words, PATTERN_RESULT_CAP, |word| {
        word.len() == length && pattern.matches(word)
    })
}

/// First `limit` words satisfying `predicate`, in input order
fn take_matching<F>(words: &[Word], limit: usize, predicate: F) -> Vec<String>
where
    F: Fn(&Word) -> bool + Sync,
{
    if words.len() >= PARALLEL_THRESHOLD {
        // Order-preserving parallel filter; truncate afterwards
        let mut matched: Vec<String> = words
            .par_iter()
            .filter(|w| predicate(w))
            .map(|w| w.text().to_string())
            .collect();
        matched.truncate(limit);
        return matched;
    }

    words
        .iter()
        .filter(|w| predicate(w))
        .take(limit)
        .map(|w| w.text().to_string())
        .collect()
}
