use axum::{
    http::{header::AUTHORIZATION, header::WWW_AUTHENTICATE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::events::{ChallengeContext, JwtBearerEvents};
use super::security_stamp::{SecurityStampValidator, StampCheck};
use super::token::{TokenError, TokenValidationParameters};
use crate::db::{RepositoryResult, TokenRepository};
use crate::metrics::AUTH_CHALLENGES_TOTAL;
use crate::models::Principal;

/// Why a presented token was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("The security stamp is no longer valid")]
    SecurityStampMismatch,
    #[error("The user no longer exists")]
    UnknownUser,
}

impl AuthFailure {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Token(err) => err.reason(),
            Self::SecurityStampMismatch => "security_stamp",
            Self::UnknownUser => "unknown_user",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticateResult {
    Success(Principal),
    /// No bearer token was presented
    NoResult,
    Fail(AuthFailure),
}

/// JWT bearer authentication: token extraction, validation, stamp
/// revalidation, and the challenge response.
pub struct JwtBearerHandler {
    parameters: TokenValidationParameters,
    stamp_validator: SecurityStampValidator,
    events: Arc<dyn JwtBearerEvents>,
}

impl JwtBearerHandler {
    pub fn new(
        parameters: TokenValidationParameters,
        stamp_validator: SecurityStampValidator,
        events: Arc<dyn JwtBearerEvents>,
    ) -> Self {
        Self {
            parameters,
            stamp_validator,
            events,
        }
    }

    pub fn parameters(&self) -> &TokenValidationParameters {
        &self.parameters
    }

    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        store: &dyn TokenRepository,
    ) -> RepositoryResult<AuthenticateResult> {
        self.authenticate_at(headers, store, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        headers: &HeaderMap,
        store: &dyn TokenRepository,
        now: DateTime<Utc>,
    ) -> RepositoryResult<AuthenticateResult> {
        let Some(token) = bearer_token(headers) else {
            return Ok(AuthenticateResult::NoResult);
        };

        let claims = match self.parameters.validate_at(token, now) {
            Ok(claims) => claims,
            Err(err) => return Ok(self.fail(err.into()).await),
        };

        if let StampCheck::Rejected(failure) =
            self.stamp_validator.validate(&claims, store, now).await?
        {
            return Ok(self.fail(failure).await);
        }

        match claims.principal() {
            Ok(principal) => Ok(AuthenticateResult::Success(principal)),
            Err(err) => Ok(self.fail(err.into()).await),
        }
    }

    async fn fail(&self, failure: AuthFailure) -> AuthenticateResult {
        self.events.on_authentication_failed(&failure).await;
        AuthenticateResult::Fail(failure)
    }

    /// Build the 401 response for an unauthenticated request.
    pub async fn challenge(&self, failure: Option<&AuthFailure>) -> Response {
        let mut context = ChallengeContext::new(failure);
        self.events.on_challenge(&mut context).await;

        match context.into_response() {
            Some(response) => {
                AUTH_CHALLENGES_TOTAL.with_label_values(&["handled"]).inc();
                response
            }
            None => {
                AUTH_CHALLENGES_TOTAL.with_label_values(&["default"]).inc();
                default_challenge(failure)
            }
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively; a missing header, another
/// scheme or an empty token all count as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let scheme = value.get(..7)?;
    let token = value.get(7..)?;
    if !scheme.eq_ignore_ascii_case("Bearer ") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Bare 401 with a `WWW-Authenticate` header describing the failure.
pub fn default_challenge(failure: Option<&AuthFailure>) -> Response {
    let header = match failure {
        None => "Bearer".to_string(),
        Some(failure) => {
            let description: String = failure
                .to_string()
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .map(|c| if c == '"' { '\'' } else { c })
                .collect();
            format!(
                "Bearer error=\"invalid_token\", error_description=\"{}\"",
                description
            )
        }
    };

    (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, header)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ApiBearerEvents, Claims, TokenIssuer};
    use crate::config::DEFAULT_TOKEN_ISSUER;
    use crate::db::memory::InMemoryTokenRepository;
    use axum::http::HeaderValue;
    use chrono::{Duration, TimeZone};

    const SECRET: &str = "handler-test-secret-0123456789abcdef";

    fn handler() -> (JwtBearerHandler, TokenIssuer) {
        let parameters = TokenValidationParameters::from_config(&crate::config::JwtConfig {
            secret: SECRET.to_string(),
            issuer: DEFAULT_TOKEN_ISSUER.to_string(),
            audience: DEFAULT_TOKEN_ISSUER.to_string(),
            token_lifetime_minutes: 60,
        });
        let issuer = TokenIssuer::new(&parameters, Duration::minutes(60));
        let handler = JwtBearerHandler::new(
            parameters,
            SecurityStampValidator::default(),
            Arc::new(ApiBearerEvents),
        );
        (handler, issuer)
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_800_000_000, 0).unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bear")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_no_result() {
        let (handler, _) = handler();
        let store = InMemoryTokenRepository::new();
        let result = handler
            .authenticate_at(&HeaderMap::new(), &store, now())
            .await
            .unwrap();
        assert_eq!(result, AuthenticateResult::NoResult);
    }

    #[tokio::test]
    async fn test_valid_token_succeeds_until_stamp_rotates() {
        let (handler, issuer) = handler();
        let store = InMemoryTokenRepository::new();
        let user = store.create_user("clerk", "hash").await.unwrap();
        let issued = issuer.issue_at(&user, now()).unwrap();
        let headers = headers(&format!("Bearer {}", issued.token));

        match handler.authenticate_at(&headers, &store, now()).await.unwrap() {
            AuthenticateResult::Success(principal) => assert_eq!(principal.user_id, user.id),
            other => panic!("expected success, got {:?}", other),
        }

        store.update_security_stamp(user.id).await.unwrap();
        assert_eq!(
            handler.authenticate_at(&headers, &store, now()).await.unwrap(),
            AuthenticateResult::Fail(AuthFailure::SecurityStampMismatch)
        );
    }

    #[tokio::test]
    async fn test_expired_token_fails() {
        let (handler, _) = handler();
        let store = InMemoryTokenRepository::new();
        let claims = Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            unique_name: "clerk".to_string(),
            ss: "S".to_string(),
            jti: "j".to_string(),
            iss: DEFAULT_TOKEN_ISSUER.to_string(),
            aud: DEFAULT_TOKEN_ISSUER.to_string(),
            iat: now().timestamp() - 100,
            nbf: now().timestamp() - 100,
            exp: now().timestamp() - 1,
        };
        let token = handler.parameters().signing_key.sign(&claims).unwrap();

        assert_eq!(
            handler
                .authenticate_at(&headers(&format!("Bearer {}", token)), &store, now())
                .await
                .unwrap(),
            AuthenticateResult::Fail(AuthFailure::Token(TokenError::Expired))
        );
    }

    #[tokio::test]
    async fn test_default_challenge_header() {
        let response = default_challenge(Some(&AuthFailure::Token(TokenError::Expired)));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[WWW_AUTHENTICATE],
            "Bearer error=\"invalid_token\", error_description=\"The token is expired\""
        );
    }

    #[tokio::test]
    async fn test_challenge_branches() {
        let (handler, _) = handler();

        let anonymous = handler.challenge(None).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
        assert!(anonymous.headers().get(WWW_AUTHENTICATE).is_none());

        let failure = AuthFailure::UnknownUser;
        let rejected = handler.challenge(Some(&failure)).await;
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
        assert!(rejected.headers().get(WWW_AUTHENTICATE).is_some());
    }
}
