//! Bulk validation and cleanup from the terminal

use crate::engine::{
    CleanupReport, CollectionValidation, EngineError, ValidationOptions, WordEngine,
};
use crate::output::formatters::validation_progress_bar;

/// Validate the whole collection with a progress bar
pub async fn run_validate(engine: &WordEngine, options: ValidationOptions) -> CollectionValidation {
    let total = engine.len();
    println!("🔍 Validating {total} words...");

    let pb = validation_progress_bar(total);
    let report = engine
        .validate_collection_with_progress(options, |progress| {
            pb.set_position(progress.checked as u64);
            pb.set_message(format!("{} invalid", progress.invalid));
        })
        .await;
    pb.finish_and_clear();

    report
}

/// Validate, then optionally remove the words the dictionary rejected
///
/// # Errors
///
/// Returns `EngineError::Persist` if removal was requested and the store
/// rejected the write.
pub async fn run_cleanup(
    engine: &WordEngine,
    options: ValidationOptions,
    auto_remove: bool,
) -> Result<CleanupReport, EngineError> {
    let validation = run_validate(engine, options).await;
    engine.cleanup_from(validation, auto_remove).await
}
