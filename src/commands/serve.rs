//! HTTP service

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::engine::{ValidationOptions, WordEngine};
use crate::server::{self, AppState, ServerConfig};

/// Serve the loaded engine until shutdown
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_serve(
    engine: Arc<WordEngine>,
    validation: ValidationOptions,
    config: &ServerConfig,
) -> Result<()> {
    let storage = engine.storage_info();
    info!(
        words = engine.len(),
        provider = storage.provider,
        connected = storage.connected,
        "starting word filter service"
    );

    let state = Arc::new(AppState { engine, validation });
    server::serve(state, config).await
}
