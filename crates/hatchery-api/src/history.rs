use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use hatchery_types::api::{CreateHistoryRequest, HistoryResponse};

use crate::error::ApiError;
use crate::{AppState, blocking, require};

/// Append a batch record. The image reference falls back to the
/// placeholder string when omitted.
pub async fn create_history(
    State(state): State<AppState>,
    Json(req): Json<CreateHistoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let batch = require(req.batch, "batch")?;
    let status = require(req.status, "status")?;
    let image = req.image.filter(|i| !i.is_empty());

    let id = blocking(&state, move |db| {
        db.insert_history(&batch, &status, image.as_deref())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(HistoryResponse { id })))
}
