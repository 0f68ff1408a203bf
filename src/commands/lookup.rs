//! Single word lookup

use crate::dictionary::ValidationResult;
use crate::engine::{EngineError, WordEngine};

/// Look a word up and note whether the collection already holds it
///
/// # Errors
///
/// Returns `EngineError::InvalidFormat` if the word is malformed.
pub async fn run_lookup(
    engine: &WordEngine,
    word: &str,
) -> Result<(ValidationResult, bool), EngineError> {
    let result = engine.lookup(word).await?;
    let in_collection = engine.exists(&result.word);
    Ok((result, in_collection))
}
