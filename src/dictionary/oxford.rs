//! Online dictionary lookup
//!
//! Fetches the public entry page for a word and reads definitions and parts of
//! speech from its markup. Outbound requests are spaced by a minimum interval
//! and results are kept in a bounded cache.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use super::cache::{CacheStats, DEFAULT_CAPACITY, LookupCache};
use super::{DictionaryLookup, LookupError, ValidationResult, normalize};
use crate::core::Word;

pub const DEFAULT_BASE_URL: &str = "https://www.oxfordlearnersdictionaries.com/definition/english/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Definitions kept per entry
const MAX_DEFINITIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct OxfordSettings {
    pub base_url: String,
    /// Minimum spacing between outbound requests
    pub min_interval: Duration,
    pub timeout: Duration,
    pub cache_capacity: usize,
}

impl Default for OxfordSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

pub struct OxfordLookup {
    client: reqwest::Client,
    base_url: String,
    min_interval: Duration,
    cache: Mutex<LookupCache>,
    last_request: tokio::sync::Mutex<Option<Instant>>,
}

impl OxfordLookup {
    /// Build the HTTP client
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Network` if the TLS backend cannot be initialised.
    pub fn new(settings: OxfordSettings) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()?;

        let mut base_url = settings.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        info!(base_url = %base_url, "dictionary lookup initialized");

        Ok(Self {
            client,
            base_url,
            min_interval: settings.min_interval,
            cache: Mutex::new(LookupCache::new(settings.cache_capacity)),
            last_request: tokio::sync::Mutex::new(None),
        })
    }

    /// Wait until the minimum interval since the previous request has passed
    ///
    /// The lock is held while sleeping, so concurrent callers queue up.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn fetch(&self, word: &Word) -> Result<ValidationResult, LookupError> {
        self.throttle().await;

        let url = format!("{}{}", self.base_url, word.text());
        debug!(word = %word, "fetching dictionary entry");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                parse_entry_page(word.text(), &body)
            }
            StatusCode::NOT_FOUND => Ok(ValidationResult::not_found(
                word.text(),
                "Not found in dictionary",
            )),
            status => {
                warn!(word = %word, status = status.as_u16(), "unexpected dictionary status");
                Err(LookupError::Status(status.as_u16()))
            }
        }
    }
}

/// Read an entry page
///
/// The page must contain an entry block; the word is valid when at least one
/// definition is present.
///
/// # Errors
///
/// Returns `LookupError::Parse` if a selector cannot be compiled.
pub fn parse_entry_page(word: &str, html: &str) -> Result<ValidationResult, LookupError> {
    let parse = |css: &str| Selector::parse(css).map_err(|e| LookupError::Parse(e.to_string()));
    let entry_sel = parse("div.entry")?;
    let def_sel = parse("span.def")?;
    let pos_sel = parse("span.pos")?;

    let document = Html::parse_document(html);

    if document.select(&entry_sel).next().is_none() {
        return Ok(ValidationResult::not_found(word, "No definition section found"));
    }

    let definitions: Vec<String> = document
        .select(&def_sel)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .take(MAX_DEFINITIONS)
        .collect();

    let mut word_forms: Vec<String> = Vec::new();
    for el in document.select(&pos_sel) {
        let form = collapse_whitespace(&el.text().collect::<String>());
        if !form.is_empty() && !word_forms.contains(&form) {
            word_forms.push(form);
        }
    }

    if definitions.is_empty() {
        return Ok(ValidationResult::not_found(word, "No definitions found"));
    }

    Ok(ValidationResult::found(word, definitions, word_forms))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl DictionaryLookup for OxfordLookup {
    async fn lookup(&self, word: &str) -> ValidationResult {
        let word = match normalize(word) {
            Ok(word) => word,
            Err(rejected) => return rejected,
        };

        let cached = self.cache.lock().get(word.text());
        if let Some(cached) = cached {
            debug!(word = %word, "dictionary cache hit");
            return cached;
        }

        match self.fetch(&word).await {
            Ok(result) => {
                self.cache.lock().insert(&result);
                result
            }
            Err(e) => {
                warn!(word = %word, error = %e, "dictionary lookup failed");
                ValidationResult::failed(word.text(), &e)
            }
        }
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }
}
