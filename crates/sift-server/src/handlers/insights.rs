//! Insight pipeline handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use sift_core::{ActivityDigest, DigestRequest, ReportSummary};

/// POST /api/digest - Per-day activity digest for one owner
pub async fn daily_digest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DigestRequest>,
) -> Result<Json<ActivityDigest>, AppError> {
    Ok(Json(state.insights.daily_digest(&request).await?))
}

/// POST /api/reports/summary - Summarize a structured report payload
pub async fn summarize_report(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ReportSummary>, AppError> {
    Ok(Json(state.insights.summarize_report(&payload).await?))
}

/// Explore request parameters
#[derive(Debug, Deserialize)]
pub struct ExploreRequest {
    pub question: String,
}

/// Explore response
#[derive(Serialize)]
pub struct ExploreResponse {
    pub answer: String,
}

/// POST /api/explore - Free-form question (never cached)
pub async fn explore(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExploreRequest>,
) -> Result<Json<ExploreResponse>, AppError> {
    let answer = state.insights.explore(&request.question).await?;
    Ok(Json(ExploreResponse { answer }))
}
