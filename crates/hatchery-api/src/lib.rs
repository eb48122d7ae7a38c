pub mod detection;
pub mod error;
pub mod history;
pub mod messages;
pub mod uploads;
pub mod users;

use std::sync::Arc;

use tracing::error;

use crate::error::ApiError;
use crate::uploads::Uploads;
use hatchery_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub uploads: Uploads,
}

/// Run blocking DB work off the async runtime, mapping both the join
/// failure and the store error into the API taxonomy.
pub(crate) async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from_store)
}

/// Presence check for a required body field. An empty string counts as
/// missing, not just an absent key.
pub(crate) fn require(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::missing_field(name)),
    }
}
