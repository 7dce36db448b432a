pub mod auth;
pub mod clients;
pub mod files;
pub mod societies;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use crate::auth::{JwtBearerHandler, TokenIssuer};
use crate::db::{
    ClientExternalRepository, DatabaseContext, FileRepository, SocietyRepository, TokenRepository,
};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

/// Everything a request handler can reach: the repositories bound at
/// startup and the bearer authentication pipeline.
pub struct AppStateInner {
    pub database: Arc<dyn DatabaseContext>,
    pub societies: Arc<dyn SocietyRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub files: Arc<dyn FileRepository>,
    pub clients: Arc<dyn ClientExternalRepository>,
    pub auth: JwtBearerHandler,
    pub token_issuer: TokenIssuer,
    /// Upper bound for decoded upload content
    pub max_file_size: usize,
    pub instance_id: String,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "dti-api",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
        },
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Readiness check: the database must answer
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = serde_json::Value),
        (status = 503, description = "Database unreachable", body = serde_json::Value)
    )
)]
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.database.backend_name();
    match state.database.test_connection().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "database": backend })),
        ),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "not_ready", "database": backend })),
            )
        }
    }
}
