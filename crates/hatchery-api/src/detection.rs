use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use hatchery_types::api::{CreateDetectionRequest, DetectionResponse};

use crate::error::ApiError;
use crate::{AppState, blocking, require};

/// Counts are stored as sent; no range validation happens here.
pub async fn create_detection(
    State(state): State<AppState>,
    Json(req): Json<CreateDetectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let total_eggs = req
        .total_eggs
        .ok_or_else(|| ApiError::missing_field("total_eggs"))?;
    let fertile = req.fertile.ok_or_else(|| ApiError::missing_field("fertile"))?;
    let infertile = req
        .infertile
        .ok_or_else(|| ApiError::missing_field("infertile"))?;
    let timestamp = require(req.timestamp, "timestamp")?;

    let id = blocking(&state, move |db| {
        db.insert_detection(total_eggs, fertile, infertile, &timestamp)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// The most recent snapshot by timestamp; a zeroed default when the
/// table is empty.
pub async fn latest_detection(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(&state, |db| db.latest_detection()).await?;

    let body = match row {
        Some(row) => DetectionResponse {
            total_eggs: row.total_eggs,
            fertile: row.fertile,
            infertile: row.infertile,
            timestamp: Some(row.timestamp),
        },
        None => DetectionResponse {
            total_eggs: 0,
            fertile: 0,
            infertile: 0,
            timestamp: None,
        },
    };

    Ok(Json(body))
}
