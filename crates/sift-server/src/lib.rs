//! Sift Web Server
//!
//! Axum-based REST API for the Sift ledger-export classifier.
//!
//! Surface:
//! - `POST /api/classify` — classify a header set (JSON body)
//! - `POST /api/classify/file` — classify an uploaded CSV export
//! - `POST /api/digest`, `POST /api/reports/summary`, `POST /api/explore`
//! - `GET /api/cache/stats`, `POST /api/cache/clear` — cache administration
//! - `GET /api/health` — AI backend configuration and liveness
//!
//! The response cache lives in process; the periodic sweep runs as an owned
//! background task started in `serve` and stopped on graceful shutdown.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use sift_core::{AIClient, CompletionBackend, ExportClassifier, InsightEngine, ResponseCache};

mod handlers;
mod sweeper;

pub use sweeper::{CacheSweeper, SweepConfig};

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub classifier: ExportClassifier,
    pub insights: InsightEngine,
    pub cache: Arc<ResponseCache>,
    pub ai: Option<AIClient>,
}

/// Create the application router, configuring the AI backend from the
/// environment.
pub fn create_router(config: ServerConfig) -> Router {
    create_router_with_ai(config, AIClient::from_env())
}

/// Create the application router with an explicit AI client (for testing).
pub fn create_router_with_ai(config: ServerConfig, ai: Option<AIClient>) -> Router {
    create_router_with_cache(config, ai, Arc::new(ResponseCache::new()))
}

/// Create the application router around an existing cache instance, so the
/// sweep task and the handlers share one store.
pub fn create_router_with_cache(
    config: ServerConfig,
    ai: Option<AIClient>,
    cache: Arc<ResponseCache>,
) -> Router {
    match &ai {
        Some(client) => info!(
            "AI backend configured: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => info!("AI backend not configured (set OLLAMA_HOST to enable the fallback path)"),
    }

    let classifier = match ai.clone() {
        Some(client) => ExportClassifier::with_ai(cache.clone(), client),
        None => ExportClassifier::new(cache.clone()),
    };
    let insights = match ai.clone() {
        Some(client) => InsightEngine::with_ai(cache.clone(), client),
        None => InsightEngine::new(cache.clone()),
    };

    let state = Arc::new(AppState {
        classifier,
        insights,
        cache,
        ai,
    });

    let api_routes = Router::new()
        // Classification
        .route("/classify", post(handlers::classify_export))
        .route("/classify/file", post(handlers::classify_file))
        // Insights
        .route("/digest", post(handlers::daily_digest))
        .route("/reports/summary", post(handlers::summarize_report))
        .route("/explore", post(handlers::explore))
        // Cache administration
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/cache/clear", post(handlers::cache_clear))
        // Health
        .route("/health", get(handlers::health));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    let ai = AIClient::from_env();
    check_ai_connection(&ai).await;

    let cache = Arc::new(ResponseCache::new());

    // The sweep task is owned here and stopped on shutdown, not left as a
    // free-running interval.
    let sweeper = SweepConfig::from_env().map(|cfg| CacheSweeper::start(cache.clone(), cfg));

    let app = create_router_with_cache(config, ai, cache);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.stop().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: &Option<AIClient>) {
    match ai {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "AI backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("AI backend not configured (set OLLAMA_HOST to enable the fallback path)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes and a stable
/// machine-readable kind in the body.
pub struct AppError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal_error",
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message,
            "kind": self.kind,
        }));

        (self.status, body).into_response()
    }
}

impl From<sift_core::Error> for AppError {
    fn from(err: sift_core::Error) -> Self {
        let kind = err.kind();
        let status = match kind {
            "invalid_request" => StatusCode::BAD_REQUEST,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            "service_error" | "malformed_result" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Sanitize unexpected errors; keep the detail for the log
            Self {
                status,
                kind,
                message: "An internal error occurred".to_string(),
                internal: Some(err.into()),
            }
        } else {
            Self {
                status,
                kind,
                message: err.to_string(),
                internal: None,
            }
        }
    }
}

#[cfg(test)]
mod tests;
