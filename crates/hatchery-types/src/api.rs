use serde::{Deserialize, Serialize};

// -- Users --

/// Required fields are `Option` so handlers can answer a missing field
/// with 400 instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user row. The password hash never leaves the db layer.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub profile_image: Option<String>,
}

// -- Concern messages --

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub user_id: Option<i64>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub response: Option<String>,
    pub created_at: String,
}

/// Admin listing joins the author onto each message.
#[derive(Debug, Serialize)]
pub struct MessageWithAuthor {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub response: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub response: Option<String>,
}

// -- Detection --

#[derive(Debug, Deserialize)]
pub struct CreateDetectionRequest {
    pub total_eggs: Option<i64>,
    pub fertile: Option<i64>,
    pub infertile: Option<i64>,
    pub timestamp: Option<String>,
}

/// `GET /detection/latest` returns zeroed counts with a null timestamp
/// when no snapshot has ever been inserted.
#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub total_eggs: i64,
    pub fertile: i64,
    pub infertile: i64,
    pub timestamp: Option<String>,
}

// -- Egg history --

#[derive(Debug, Deserialize)]
pub struct CreateHistoryRequest {
    pub batch: Option<String>,
    pub status: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub id: i64,
}
