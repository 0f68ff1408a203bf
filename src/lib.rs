//! Word Filter
//!
//! A word collection service: filtered queries, puzzle pattern matching and
//! dictionary validation over a collection persisted to a local file or
//! S3-compatible object storage.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use word_filter::dictionary::StaticDictionary;
//! use word_filter::engine::{WordEngine, WordQuery};
//! use word_filter::store::MemoryStore;
//! use word_filter::wordlists::words_from_slice;
//!
//! # async fn demo() -> Result<(), word_filter::engine::EngineError> {
//! let store = Arc::new(MemoryStore::with_words(&words_from_slice(&["apple", "banana"])));
//! let dictionary = Arc::new(StaticDictionary::new(words_from_slice(&["apple", "banana"])));
//! let engine = WordEngine::new(store, dictionary);
//! engine.load().await;
//!
//! engine.add_word("cherry").await?;
//! let words = engine.query(&WordQuery::default().starts_with("b"))?;
//! assert_eq!(words, ["banana"]);
//! # Ok(())
//! # }
//! ```

// Core domain types
pub mod core;

// Word lists and the persisted text format
pub mod wordlists;

// Persistent stores
pub mod store;

// Dictionary lookups
pub mod dictionary;

// Word set engine
pub mod engine;

// HTTP request layer
pub mod server;

// Runtime configuration
pub mod config;

// Command implementations
pub mod commands;

// Terminal output formatting
pub mod output;
