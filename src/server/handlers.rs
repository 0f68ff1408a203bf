//! Route handlers
//!
//! Handlers validate request shape and delegate to the engine. Anything that
//! writes to the store runs on its own task so a dropped connection cannot
//! abandon a commit halfway.

use std::future::Future;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::error::ApiError;
use crate::core::Word;
use crate::engine::{EngineError, MAX_LISTING_LIMIT, ValidationOptions, WordQuery};

/// Largest batch size accepted by the cleanup endpoint
const MAX_CLEANUP_BATCH: usize = 100;

/// Malformed entries echoed back when a batch is rejected
const REJECTED_PREVIEW: usize = 5;

type Shared = State<Arc<AppState>>;
type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct WordRequest {
    pub word: String,
}

#[derive(Debug, Deserialize)]
pub struct WordsRequest {
    pub words: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub word: String,
    #[serde(default, alias = "skip_oxford")]
    pub skip_lookup: bool,
}

const fn default_cleanup_batch() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    #[serde(default)]
    pub auto_remove: bool,
    #[serde(default = "default_cleanup_batch")]
    pub batch_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct InteractiveParams {
    pub length: i64,
    pub pattern: String,
}

const fn default_listing_limit() -> usize {
    1000
}

#[derive(Debug, Deserialize)]
pub struct ListingParams {
    #[serde(default = "default_listing_limit")]
    pub limit: usize,
}

/// Run an engine call to completion even if the client goes away
async fn detached<T, F>(operation: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, EngineError>> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::spawn(operation).await??)
}

/// Trimmed, non-empty, alphabetic; mirrors `Word::new` with HTTP wording
fn require_word(raw: &str) -> Result<String, ApiError> {
    let word = raw.trim();
    if word.is_empty() {
        return Err(ApiError::bad_request("Word cannot be empty"));
    }
    if Word::new(word).is_err() {
        return Err(ApiError::bad_request("Word must contain only letters"));
    }
    Ok(word.to_string())
}

pub async fn root(State(state): Shared) -> Json<Value> {
    let info = state.engine.storage_info();
    Json(json!({
        "message": "Word Filter API",
        "version": env!("CARGO_PKG_VERSION"),
        "total_words": state.engine.len(),
        "storage_provider": info.provider,
        "storage_type": info.descriptor.kind(),
        "features": [
            "filtered word queries",
            "pattern matching",
            "dictionary validation",
            "collection cleanup",
            "timestamped backups",
        ],
    }))
}

pub async fn health(State(state): Shared) -> Json<Value> {
    let info = state.engine.storage_info();
    Json(json!({
        "status": "healthy",
        "word_count": state.engine.len(),
        "state": state.engine.state(),
        "validating": state.engine.is_validating(),
        "storage_connected": info.connected,
        "storage_provider": info.provider,
        "storage_type": info.descriptor.kind(),
    }))
}

pub async fn filter_words(
    State(state): Shared,
    params: Result<Query<WordQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let Query(query) = params?;
    Ok(Json(state.engine.query(&query)?))
}

pub async fn stats(State(state): Shared) -> Json<Value> {
    Json(json!(state.engine.stats()))
}

pub async fn by_length(
    State(state): Shared,
    length: Result<Path<i64>, PathRejection>,
) -> ApiResult {
    let Path(length) = length?;
    let length = usize::try_from(length).unwrap_or(0);
    Ok(Json(json!(state.engine.words_by_length(length)?)))
}

pub async fn interactive(
    State(state): Shared,
    params: Result<Query<InteractiveParams>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let Query(params) = params?;
    let length = usize::try_from(params.length).unwrap_or(0);
    Ok(Json(state.engine.match_pattern(length, &params.pattern)))
}

pub async fn all_words(
    State(state): Shared,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    if !(1..=MAX_LISTING_LIMIT).contains(&params.limit) {
        return Err(ApiError::bad_request(format!(
            "limit must be between 1 and {MAX_LISTING_LIMIT}"
        )));
    }
    Ok(Json(json!(state.engine.all_words(params.limit)?)))
}

pub async fn add_word(
    State(state): Shared,
    payload: Result<Json<WordRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let word = require_word(&request.word)?;

    let engine = state.engine.clone();
    let outcome = detached(async move { engine.add_word(&word).await }).await?;

    let message = if outcome.was_new {
        format!("Word '{}' added successfully", outcome.word)
    } else {
        format!("Word '{}' already exists", outcome.word)
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "word": outcome.word,
        "was_new": outcome.was_new,
        "total_words": outcome.total_words,
    })))
}

pub async fn add_batch(
    State(state): Shared,
    payload: Result<Json<WordsRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    if request.words.is_empty() {
        return Err(ApiError::bad_request("Words list cannot be empty"));
    }

    let invalid: Vec<&str> = request
        .words
        .iter()
        .map(String::as_str)
        .filter(|w| Word::new(w).is_err())
        .take(REJECTED_PREVIEW)
        .collect();
    if !invalid.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Invalid words (must contain only letters): {invalid:?}"
        )));
    }

    let engine = state.engine.clone();
    let words = request.words;
    let outcome = detached(async move { engine.add_words(&words).await }).await?;

    let added = outcome.affected_count();
    Ok(Json(json!({
        "success": true,
        "added_count": added,
        "total_submitted": outcome.submitted,
        "skipped_count": outcome.skipped_count(),
        "added_words": outcome.affected,
        "total_words": outcome.total_words,
        "message": format!("Added {added} new words out of {} submitted", outcome.submitted),
    })))
}

pub async fn check_word(
    State(state): Shared,
    payload: Result<Json<WordRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let word = request.word.trim().to_lowercase();
    if word.is_empty() {
        return Err(ApiError::bad_request("Word cannot be empty"));
    }

    let exists = state.engine.exists(&word);
    let verb = if exists { "exists" } else { "does not exist" };
    Ok(Json(json!({
        "word": word,
        "exists": exists,
        "message": format!("Word '{word}' {verb} in collection"),
    })))
}

pub async fn reload(State(state): Shared) -> ApiResult {
    let engine = state.engine.clone();
    let total = detached(async move { engine.reload().await }).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Words reloaded from storage",
        "total_words": total,
        "storage_provider": state.engine.storage_info().provider,
    })))
}

pub async fn backup(State(state): Shared) -> ApiResult {
    let engine = state.engine.clone();
    let report = detached(async move { engine.backup().await }).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Backed up {} words", report.word_count),
        "backup_location": report.backup_location,
        "word_count": report.word_count,
        "timestamp": report.timestamp,
    })))
}

pub async fn validate_word(
    State(state): Shared,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let word = require_word(&request.word)?;

    let result = state.engine.lookup(&word).await?;
    Ok(Json(json!({
        "success": true,
        "word": result.word,
        "validation": result,
        "message": format!("Validation complete for '{word}'"),
    })))
}

pub async fn add_validated(
    State(state): Shared,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let word = require_word(&request.word)?;
    let skip_lookup = request.skip_lookup;

    let engine = state.engine.clone();
    let outcome =
        detached(async move { engine.add_word_validated(&word, skip_lookup).await }).await?;

    let message = if outcome.was_new {
        format!("Word '{}' added successfully", outcome.word)
    } else {
        format!("Word '{}' already exists", outcome.word)
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "word": outcome.word,
        "was_new": outcome.was_new,
        "validation": outcome.validation,
        "total_words": outcome.total_words,
    })))
}

pub async fn remove_word(
    State(state): Shared,
    payload: Result<Json<WordRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    if request.word.trim().is_empty() {
        return Err(ApiError::bad_request("Word cannot be empty"));
    }

    let engine = state.engine.clone();
    let outcome = detached(async move { engine.remove_word(&request.word).await }).await?;

    let message = if outcome.was_present {
        format!("Word '{}' removed successfully", outcome.word)
    } else {
        format!("Word '{}' was not in the collection", outcome.word)
    };
    Ok(Json(json!({
        "success": true,
        "word": outcome.word,
        "was_present": outcome.was_present,
        "message": message,
        "total_words": outcome.total_words,
    })))
}

pub async fn remove_batch(
    State(state): Shared,
    payload: Result<Json<WordsRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    if request.words.is_empty() {
        return Err(ApiError::bad_request("Words list cannot be empty"));
    }

    let engine = state.engine.clone();
    let words = request.words;
    let outcome = detached(async move { engine.remove_words(&words).await }).await?;

    let removed = outcome.affected_count();
    Ok(Json(json!({
        "success": true,
        "removed_count": removed,
        "total_submitted": outcome.submitted,
        "not_found_count": outcome.skipped_count(),
        "removed_words": outcome.affected,
        "total_words": outcome.total_words,
        "message": format!("Removed {removed} words out of {} submitted", outcome.submitted),
    })))
}

/// Read-only; dropping the request cancels the run
pub async fn validate_collection(State(state): Shared) -> Json<Value> {
    let report = state.engine.validate_collection(state.validation).await;
    Json(json!({
        "success": true,
        "validation_summary": {
            "total_words": report.total_words,
            "valid_words": report.valid_words,
            "invalid_words": report.invalid_words,
            "validity_percentage": report.validity_percentage(),
        },
        "invalid_words": report.invalid_word_list,
        "unverified_words": report.unverified_word_list,
        "message": format!(
            "Validation complete: {}/{} words are valid",
            report.valid_words, report.total_words
        ),
    }))
}

/// Validation runs in the request; only the removal is detached
pub async fn cleanup(
    State(state): Shared,
    payload: Result<Json<CleanupRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let options = ValidationOptions {
        batch_size: request.batch_size.clamp(1, MAX_CLEANUP_BATCH),
        ..state.validation
    };

    let validation = state.engine.validate_collection(options).await;
    let engine = state.engine.clone();
    let auto_remove = request.auto_remove;
    let report =
        detached(async move { engine.cleanup_from(validation, auto_remove).await }).await?;

    Ok(Json(json!({
        "success": true,
        "cleanup_summary": {
            "found_invalid": report.found_invalid,
            "removed_count": report.removed_count,
            "action_taken": report.action_taken,
        },
        "invalid_words": report.invalid_words,
        "unverified_words": report.unverified_words,
        "total_words": state.engine.len(),
        "message": report.action_taken,
    })))
}

pub async fn dictionary_stats(State(state): Shared) -> Json<Value> {
    let stats = state.engine.cache_stats();
    Json(json!({
        "success": true,
        "dictionary_cache": stats,
        "hit_rate": stats.hit_rate(),
        "message": "Dictionary cache statistics retrieved",
    }))
}

pub async fn storage_info(State(state): Shared) -> Json<Value> {
    Json(json!({
        "success": true,
        "storage_info": state.engine.storage_info(),
    }))
}

pub async fn storage_test(State(state): Shared) -> Json<Value> {
    let probe = state.engine.test_storage().await;
    Json(json!({
        "success": probe.success,
        "connection_test": probe,
    }))
}
