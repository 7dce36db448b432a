use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use tracing::{error, info, warn};

use super::AppState;
use crate::auth::verify_password;
use crate::errors::{ApiResponse, ErrorModel};
use crate::metrics::TOKENS_ISSUED_TOTAL;
use crate::models::{LoginRequest, Principal};
use crate::validation::ValidatedJson;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = crate::errors::LoginEnvelope),
        (status = 400, description = "Invalid request body", body = ErrorModel),
        (status = 401, description = "Invalid credentials", body = ErrorModel)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Response, ErrorModel> {
    let username = request.username.trim();
    let Some(user) = state.tokens.find_user_by_username(username).await? else {
        info!(username = %username, "Login for unknown user");
        return Err(ErrorModel::unauthorized(INVALID_CREDENTIALS));
    };

    // Argon2 verification blocks for tens of milliseconds.
    let password = request.password;
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            error!("Password verification task failed: {}", e);
            ErrorModel::internal_error()
        })?
        .map_err(|e| {
            error!(user_id = %user.id, "Stored password hash is unusable: {}", e);
            ErrorModel::internal_error()
        })?;

    if !verified {
        warn!(user_id = %user.id, "Login with wrong password");
        return Err(ErrorModel::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = state.token_issuer.issue(&user).map_err(|e| {
        error!("Failed to sign token: {}", e);
        ErrorModel::internal_error()
    })?;
    TOKENS_ISSUED_TOTAL.inc();
    info!(user_id = %user.id, expires_at = %issued.expires_at, "Token issued");

    Ok(ApiResponse::success(issued).into_response())
}

/// Rotate the caller's security stamp, revoking every token issued so far
#[utoipa::path(
    post,
    path = "/api/auth/logout-everywhere",
    tag = "auth",
    responses(
        (status = 204, description = "All tokens of the caller revoked"),
        (status = 401, description = "Missing or invalid token", body = ErrorModel),
        (status = 404, description = "User no longer exists", body = ErrorModel)
    )
)]
pub async fn logout_everywhere(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<StatusCode, ErrorModel> {
    match state.tokens.update_security_stamp(principal.user_id).await? {
        Some(_) => {
            info!(user_id = %principal.user_id, "Security stamp rotated");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ErrorModel::not_found(format!(
            "User {} not found",
            principal.user_id
        ))),
    }
}

/// The authenticated caller
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current principal", body = crate::errors::PrincipalResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorModel)
    )
)]
pub async fn me(Extension(principal): Extension<Principal>) -> ApiResponse<Principal> {
    ApiResponse::success(principal)
}
