use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use super::handler::AuthFailure;
use crate::errors::ErrorModel;
use crate::metrics::AUTH_FAILURES_TOTAL;

/// State handed to [`JwtBearerEvents::on_challenge`].
///
/// A hook that writes a response takes over the challenge; otherwise the
/// default bearer challenge is sent.
pub struct ChallengeContext<'a> {
    failure: Option<&'a AuthFailure>,
    response: Option<Response>,
}

impl<'a> ChallengeContext<'a> {
    pub fn new(failure: Option<&'a AuthFailure>) -> Self {
        Self {
            failure,
            response: None,
        }
    }

    /// Why authentication failed, if a token was presented and rejected
    pub fn authenticate_failure(&self) -> Option<&'a AuthFailure> {
        self.failure
    }

    pub fn write_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    pub fn is_handled(&self) -> bool {
        self.response.is_some()
    }

    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

/// Hooks invoked by the bearer handler on the request path.
///
/// Both run inline with the request and must not block.
#[async_trait]
pub trait JwtBearerEvents: Send + Sync {
    async fn on_authentication_failed(&self, _failure: &AuthFailure) {}

    async fn on_challenge(&self, _context: &mut ChallengeContext<'_>) {}
}

/// Events registered by the API host.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiBearerEvents;

#[async_trait]
impl JwtBearerEvents for ApiBearerEvents {
    async fn on_authentication_failed(&self, failure: &AuthFailure) {
        warn!(reason = failure.reason(), error = %failure, "Bearer authentication failed");
        AUTH_FAILURES_TOTAL
            .with_label_values(&[failure.reason()])
            .inc();
    }

    async fn on_challenge(&self, context: &mut ChallengeContext<'_>) {
        // Only an anonymous challenge gets the envelope. A rejected token
        // keeps the default challenge with its error description.
        if context.authenticate_failure().is_none() {
            debug!("Challenge without failure, writing token validation envelope");
            context.write_response(ErrorModel::token_validation_failed().into_response());
        } else {
            debug!("Challenge with attached failure, using default response");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenError;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_challenge_without_failure_writes_envelope() {
        let mut context = ChallengeContext::new(None);
        ApiBearerEvents.on_challenge(&mut context).await;
        assert!(context.is_handled());
        let response = context.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_challenge_with_failure_is_left_alone() {
        let failure = AuthFailure::Token(TokenError::Expired);
        let mut context = ChallengeContext::new(Some(&failure));
        ApiBearerEvents.on_challenge(&mut context).await;
        assert!(!context.is_handled());
        assert!(context.into_response().is_none());
    }
}
