//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use sift_core::CompletionBackend;

/// AI backend status
#[derive(Serialize)]
pub struct AiHealth {
    pub configured: bool,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Health response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai: AiHealth,
}

/// GET /api/health - Server and AI backend status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai = match &state.ai {
        Some(client) => AiHealth {
            configured: true,
            healthy: client.health_check().await,
            model: Some(client.model().to_string()),
            host: Some(client.host().to_string()),
        },
        None => AiHealth {
            configured: false,
            healthy: false,
            model: None,
            host: None,
        },
    };

    Json(HealthResponse { status: "ok", ai })
}
