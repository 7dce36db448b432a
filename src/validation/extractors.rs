use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ModelState;
use crate::errors::ErrorModel;

/// Why a JSON body was refused.
///
/// A body over the route's size limit is a 413, not a model error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonBodyRejection {
    InvalidModel(ModelState),
    TooLarge,
}

impl From<ModelState> for JsonBodyRejection {
    fn from(state: ModelState) -> Self {
        Self::InvalidModel(state)
    }
}

impl From<JsonRejection> for JsonBodyRejection {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::TooLarge;
        }
        Self::InvalidModel(ModelState::from(rejection))
    }
}

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidModel(state) => state.into_response(),
            Self::TooLarge => {
                ErrorModel::payload_too_large("Request body exceeds the size limit").into_response()
            }
        }
    }
}

/// JSON body that has been deserialized and validated.
///
/// Any failure, malformed JSON included, is rejected with the 400 envelope,
/// except a body over the size limit which gets the 413 envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = JsonBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate().map_err(|e| ModelState::from(&e))?;
        Ok(Self(value))
    }
}

/// Query string that has been deserialized and validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ModelState;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate().map_err(|e| ModelState::from(&e))?;
        Ok(Self(value))
    }
}

/// Path parameters whose parse failures use the 400 envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ModelState;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::DefaultBodyLimit, routing::post, Router};
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 2, message = "Name too short."))]
        name: String,
        #[validate(range(min = 1, max = 10, message = "Count out of range."))]
        count: u32,
    }

    async fn accept(ValidatedJson(payload): ValidatedJson<Payload>) -> impl IntoResponse {
        format!("{}:{}", payload.name, payload.count)
    }

    fn app() -> Router {
        Router::new()
            .route("/", post(accept))
            .layer(DefaultBodyLimit::max(64))
    }

    async fn send(body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let (status, body) = send(r#"{"name":"ok","count":3}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok:3");
    }

    #[tokio::test]
    async fn test_invalid_fields_produce_envelope() {
        let (status, body) = send(r#"{"name":"x","count":99}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["isSuccess"], false);
        assert_eq!(json["errorCode"], 400);
        assert_eq!(json["message"], "Bad Request");
        assert_eq!(
            json["data"],
            serde_json::json!(["Count out of range.", "Name too short."])
        );
    }

    #[tokio::test]
    async fn test_malformed_json_produces_single_message() {
        let (status, body) = send(r#"{"name": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errorCode"], 400);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_payload_too_large() {
        let oversized = format!(r#"{{"name":"{}","count":3}}"#, "a".repeat(200));
        let (status, body) = send(oversized).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errorCode"], 413);
        assert!(json.get("data").is_none());
    }
}
