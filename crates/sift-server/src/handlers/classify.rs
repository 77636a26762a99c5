//! Classification handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use sift_core::{
    read_export_preview, ClassificationOutcome, ClassificationRequest, DEFAULT_PREVIEW_ROWS,
};

/// POST /api/classify - Classify a header set
pub async fn classify_export(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClassificationRequest>,
) -> Result<Json<ClassificationOutcome>, AppError> {
    let outcome = state.classifier.classify(&request).await?;

    info!(
        source_system = %outcome.result.source_system,
        ledger_type = outcome.result.ledger_type.as_str(),
        cached = outcome.cached,
        "Classified export"
    );

    Ok(Json(outcome))
}

/// POST /api/classify/file - Classify an uploaded CSV export
///
/// Expects multipart form with:
/// - file: CSV file (required, max 10MB)
/// - rows: Number of sample rows to read (optional)
pub async fn classify_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ClassificationOutcome>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut max_rows = DEFAULT_PREVIEW_ROWS;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;

                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "rows" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read rows field"))?;
                max_rows = value
                    .parse()
                    .map_err(|_| AppError::bad_request(&format!("Invalid rows value: {}", value)))?;
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let request = read_export_preview(file_data.as_slice(), max_rows)?;

    Ok(Json(state.classifier.classify(&request).await?))
}
