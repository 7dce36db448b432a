use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::handlers::AppState;
use crate::auth::AuthenticateResult;
use crate::errors::ErrorModel;

/// Bearer authentication guard for protected routes.
///
/// On success the [`Principal`](crate::models::Principal) is inserted into
/// the request extensions. Otherwise the handler's challenge is returned:
/// without a token the fixed 401 envelope, with a rejected token the
/// default bearer challenge.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = state
        .auth
        .authenticate(request.headers(), state.tokens.as_ref())
        .await;

    match result {
        Ok(AuthenticateResult::Success(principal)) => {
            debug!(user_id = %principal.user_id, "Bearer authentication succeeded");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Ok(AuthenticateResult::NoResult) => state.auth.challenge(None).await,
        Ok(AuthenticateResult::Fail(failure)) => state.auth.challenge(Some(&failure)).await,
        Err(err) => ErrorModel::from(err).into_response(),
    }
}
