use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use hatchery_api::{AppState, AppStateInner, detection, history, messages, uploads::Uploads, users};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hatchery=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("HATCHERY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("HATCHERY_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;
    let db_path = std::env::var("HATCHERY_DB_PATH").unwrap_or_else(|_| "hatchery.db".into());
    let upload_dir: PathBuf = std::env::var("HATCHERY_UPLOAD_DIR")
        .unwrap_or_else(|_| "./uploads".into())
        .into();

    // Init database and upload storage
    let db = hatchery_db::Database::open(&PathBuf::from(&db_path))?;
    let uploads = Uploads::new(upload_dir).await?;

    let state: AppState = Arc::new(AppStateInner { db, uploads });

    // Routes — all public, CORS open to every origin
    let app = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/user", get(users::get_users))
        .route("/user/{id}", get(users::get_user))
        .route("/user/{id}", put(users::update_user))
        .route("/user/{id}", delete(users::delete_user))
        .route("/messages", post(messages::create_message))
        .route("/messages", get(messages::list_messages))
        .route("/messages/{user_id}", get(messages::list_user_messages))
        .route("/messages/respond/{id}", put(messages::respond))
        .route("/detection", post(detection::create_detection))
        .route("/detection/latest", get(detection::latest_detection))
        .route("/history", post(history::create_history))
        .route("/test", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Hatchery API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "API is working" }))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
