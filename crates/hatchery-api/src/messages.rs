use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use hatchery_types::api::{
    CreateMessageRequest, MessageResponse, MessageWithAuthor, RespondRequest,
};

use crate::error::ApiError;
use crate::{AppState, blocking, require};

pub async fn create_message(
    State(state): State<AppState>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = req.user_id.ok_or_else(|| ApiError::missing_field("user_id"))?;
    let subject = require(req.subject, "subject")?;
    let message = require(req.message, "message")?;

    let id = blocking(&state, move |db| {
        db.insert_message(user_id, &subject, &message)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Admin view: every concern message with its author, newest first.
pub async fn list_messages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |db| db.list_messages_with_authors()).await?;
    let messages: Vec<MessageWithAuthor> = rows
        .into_iter()
        .map(|row| MessageWithAuthor {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            email: row.email,
            subject: row.subject,
            message: row.message,
            response: row.response,
            created_at: row.created_at,
        })
        .collect();
    Ok(Json(messages))
}

pub async fn list_user_messages(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| db.list_messages_for_user(user_id)).await?;
    let messages: Vec<MessageResponse> = rows
        .into_iter()
        .map(|row| MessageResponse {
            id: row.id,
            user_id: row.user_id,
            subject: row.subject,
            message: row.message,
            response: row.response,
            created_at: row.created_at,
        })
        .collect();
    Ok(Json(messages))
}

/// Admin reply. 404 when no message with that id exists.
pub async fn respond(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RespondRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = require(req.response, "response")?;

    let n = blocking(&state, move |db| db.respond_to_message(id, &response)).await?;
    if n == 0 {
        return Err(ApiError::NotFound("Message not found".into()));
    }

    Ok(Json(json!({ "message": "Response saved" })))
}
