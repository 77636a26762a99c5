//! Cache administration handlers
//!
//! The cache itself never errors; unknown strategy names are rejected here,
//! at the HTTP boundary, before they reach it.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState};
use sift_core::{CacheStats, Strategy};

/// GET /api/cache/stats - Cache entry counts and size estimate
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// Clear request parameters
#[derive(Debug, Deserialize, Default)]
pub struct CacheClearRequest {
    /// Restrict the clear to one strategy's namespace
    #[serde(default)]
    pub strategy: Option<String>,
}

/// Clear response
#[derive(Serialize)]
pub struct CacheClearResponse {
    pub removed: usize,
}

/// POST /api/cache/clear - Remove cache entries, optionally per strategy
pub async fn cache_clear(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CacheClearRequest>,
) -> Result<Json<CacheClearResponse>, AppError> {
    let strategy = match request.strategy.as_deref() {
        Some(name) => Some(Strategy::from_name(name).ok_or_else(|| {
            AppError::bad_request(&format!("Unknown cache strategy: {}", name))
        })?),
        None => None,
    };

    let removed = state.cache.clear(strategy);
    info!(
        removed,
        strategy = strategy.map(|s| s.name()).unwrap_or("all"),
        "Cleared cache entries"
    );

    Ok(Json(CacheClearResponse { removed }))
}
