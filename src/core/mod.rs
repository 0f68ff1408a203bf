//! Core domain types for the word collection
//!
//! This module contains the fundamental domain types with no I/O.
//! All types here are pure and testable.

mod pattern;
mod word;

pub use pattern::WordPattern;
pub use word::{Word, WordError};
