//! HTTP request layer
//!
//! Thin axum router over [`WordEngine`]. All state lives in the engine; the
//! router only adds CORS and request tracing.

mod error;
mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::engine::{ValidationOptions, WordEngine};

/// Shared handler state
pub struct AppState {
    pub engine: Arc<WordEngine>,
    /// Throttling used by collection validation and cleanup
    pub validation: ValidationOptions,
}

/// Listener and CORS settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin; otherwise an explicit list
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            cors_origins: vec!["*".to_string()],
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router
pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/words", get(handlers::filter_words))
        .route("/words/stats", get(handlers::stats))
        .route("/words/by-length/{length}", get(handlers::by_length))
        .route("/words/interactive", get(handlers::interactive))
        .route("/words/all", get(handlers::all_words))
        .route("/words/add", post(handlers::add_word))
        .route("/words/add-batch", post(handlers::add_batch))
        .route("/words/check", post(handlers::check_word))
        .route("/words/reload", post(handlers::reload))
        .route("/words/backup", post(handlers::backup))
        .route("/words/validate", post(handlers::validate_word))
        .route("/words/add-validated", post(handlers::add_validated))
        .route("/words/remove", post(handlers::remove_word))
        .route("/words/remove-batch", post(handlers::remove_batch))
        .route("/words/validate-collection", post(handlers::validate_collection))
        .route("/words/cleanup", post(handlers::cleanup))
        .route("/words/dictionary-stats", get(handlers::dictionary_stats))
        .route("/storage/info", get(handlers::storage_info))
        .route("/storage/test", get(handlers::storage_test))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Bind and serve until Ctrl-C
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: Arc<AppState>, config: &ServerConfig) -> anyhow::Result<()> {
    let app = router(state, &config.cors_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("word filter listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
