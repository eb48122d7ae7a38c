use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use hatchery_db::models::UserRow;
use hatchery_types::api::{LoginRequest, RegisterRequest, RegisterResponse, UserResponse};

use crate::error::ApiError;
use crate::{AppState, blocking, require};

/// Strip the password hash before anything leaves the API.
fn public_view(row: UserRow) -> UserResponse {
    UserResponse {
        id: row.id,
        username: row.username,
        email: row.email,
        role: row.role,
        profile_image: row.profile_image,
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = require(req.username, "username")?;
    let email = require(req.email, "email")?;
    let password = require(req.password, "password")?;
    let role = req.role.unwrap_or_else(|| "user".to_string());

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .to_string();

    // A duplicate email trips the store's UNIQUE constraint and comes
    // back as a 400 with the raw store message.
    let id = blocking(&state, move |db| {
        db.create_user(&username, &email, &password_hash, &role)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = require(req.email, "email")?;
    let password = require(req.password, "password")?;

    let user = blocking(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Unknown email and wrong password answer identically.
    let parsed_hash = PasswordHash::new(&user.password).map_err(|_| ApiError::Unauthorized)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Json(public_view(user)))
}

pub async fn get_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |db| db.list_users()).await?;
    let users: Vec<UserResponse> = rows.into_iter().map(public_view).collect();
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |db| db.get_user_by_id(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(public_view(user)))
}

/// Multipart profile edit. `username` and `email` are required; `role`
/// and the `profile_image` file are optional, and the stored image path
/// is only overwritten when a file was actually supplied.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut form: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut username = None;
    let mut email = None;
    let mut role = None;
    let mut image: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "username" => {
                username = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            "email" => {
                email = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            "role" => {
                role = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            "profile_image" => {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                image = Some((file_name, data));
            }
            _ => {}
        }
    }

    // Required fields answer 400 before any row is touched.
    let username = require(username, "username")?;
    let email = require(email, "email")?;
    let role = role.filter(|r| !r.is_empty());

    // The upload is resolved before the row update.
    let image_path = match image {
        Some((file_name, data)) => Some(
            state
                .uploads
                .save_profile_image(id, &file_name, &data)
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?,
        ),
        None => None,
    };

    let n = blocking(&state, move |db| {
        db.update_user(id, &username, &email, role.as_deref(), image_path.as_deref())
    })
    .await?;
    if n == 0 {
        return Err(ApiError::NotFound("User not found".into()));
    }

    let user = blocking(&state, move |db| db.get_user_by_id(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(public_view(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let n = blocking(&state, move |db| db.delete_user(id)).await?;
    if n == 0 {
        return Err(ApiError::NotFound("User not found".into()));
    }
    Ok(Json(json!({ "message": "User deleted" })))
}
