use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::auth::{login, logout_everywhere, me};
use super::handlers::clients::{get_client, list_clients, register_client};
use super::handlers::files::{delete_file, download_file, get_file, upload_file};
use super::handlers::societies::{
    create_society, delete_society, get_society, list_society_files, list_societies,
    update_society,
};
use super::handlers::{health, health_ready, AppState};
use super::middleware::{logging_middleware, require_bearer};
use super::openapi::{ApiDoc, OPENAPI_JSON_PATH, SWAGGER_UI_PATH};
use crate::metrics;

/// Slack on top of the base64-encoded content for the rest of the upload body
const UPLOAD_ENVELOPE_BYTES: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state.max_file_size.div_ceil(3) * 4 + UPLOAD_ENVELOPE_BYTES;

    // Everything below requires a valid bearer token
    let protected = Router::new()
        .route("/api/auth/logout-everywhere", post(logout_everywhere))
        .route("/api/auth/me", get(me))
        .route("/api/societies", get(list_societies).post(create_society))
        .route(
            "/api/societies/:id",
            get(get_society).put(update_society).delete(delete_society),
        )
        .route("/api/societies/:id/files", get(list_society_files))
        .route(
            "/api/files",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/files/:id", get(get_file).delete(delete_file))
        .route("/api/files/:id/content", get(download_file))
        .route("/api/clients", get(list_clients).post(register_client))
        .route("/api/clients/:client_id", get(get_client))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        // Health check
        .route("/health", get(health))
        .route("/health/ready", get(health_ready))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        .route("/api/auth/login", post(login))
        .merge(protected)
        // OpenAPI documentation
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        // Add middleware (order matters: compression -> logging -> metrics -> cors -> trace)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
