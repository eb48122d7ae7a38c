use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// API failure taxonomy. Store errors are surfaced with their raw text;
/// only the authentication failure hides its cause behind a fixed
/// message, so callers cannot tell a wrong password from an unknown
/// email.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Store-level constraint violation, e.g. a duplicate email.
    #[error("{0}")]
    Constraint(String),

    /// A required body field is missing or the payload is unusable.
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Any other store failure, raw message included.
    #[error("{0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Classify a failure coming out of the db layer: constraint
    /// violations become 400, everything else 500.
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast_ref::<rusqlite::Error>() {
            Some(e)
                if matches!(
                    e.sqlite_error_code(),
                    Some(rusqlite::ErrorCode::ConstraintViolation)
                ) =>
            {
                ApiError::Constraint(e.to_string())
            }
            _ => ApiError::Database(err.to_string()),
        }
    }

    pub fn missing_field(name: &str) -> Self {
        ApiError::BadRequest(format!("Missing required field: {name}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Constraint(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_maps_to_400_with_raw_text() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE u (email TEXT UNIQUE); INSERT INTO u VALUES ('x');")
            .unwrap();
        let store_err: anyhow::Error = conn
            .execute("INSERT INTO u VALUES ('x')", [])
            .unwrap_err()
            .into();

        let api_err = ApiError::from_store(store_err);
        assert!(matches!(api_err, ApiError::Constraint(_)));
        assert!(api_err.to_string().contains("UNIQUE"));
        assert_eq!(api_err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_store_errors_map_to_500() {
        let err = ApiError::from_store(anyhow::anyhow!("disk I/O error"));
        assert!(matches!(err, ApiError::Database(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::missing_field("email").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("User not found".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn unauthorized_message_is_generic() {
        assert_eq!(ApiError::Unauthorized.to_string(), "Invalid email or password");
    }
}
