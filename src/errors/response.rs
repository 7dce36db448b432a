use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::codes::ErrorCode;
use crate::models::{ClientExternal, LoginResponse, Principal, Society, StoredFile};

/// Message written when a bearer challenge has no failure attached.
pub const TOKEN_VALIDATION_FAILED: &str = "Token Validation Has Failed. Request Access Denied";

/// Uniform error envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorModel {
    /// Always false for errors
    pub is_success: bool,
    /// HTTP status code set on the response
    pub error_code: u16,
    /// Human-readable summary
    pub message: String,
    /// Validation messages, only present on 400 validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<String>>,
}

impl ErrorModel {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            error_code: code.status_code(),
            message: message.into(),
            data: None,
        }
    }

    /// Envelope for a failed model validation: 400 "Bad Request" with every message.
    pub fn bad_request(messages: Vec<String>) -> Self {
        Self {
            data: Some(messages),
            ..Self::new(ErrorCode::BadRequest, ErrorCode::BadRequest.default_message())
        }
    }

    /// Envelope written by the bearer challenge when no failure is attached.
    pub fn token_validation_failed() -> Self {
        Self::new(ErrorCode::Unauthorized, TOKEN_VALIDATION_FAILED)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    pub fn internal_error() -> Self {
        Self::new(
            ErrorCode::InternalError,
            ErrorCode::InternalError.default_message(),
        )
    }
}

impl IntoResponse for ErrorModel {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.error_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}

/// Success envelope, same shape as the error envelope
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(
    SocietyResponse = ApiResponse<Society>,
    SocietyListResponse = ApiResponse<Vec<Society>>,
    FileResponse = ApiResponse<StoredFile>,
    FileListResponse = ApiResponse<Vec<StoredFile>>,
    ClientResponse = ApiResponse<ClientExternal>,
    ClientListResponse = ApiResponse<Vec<ClientExternal>>,
    LoginEnvelope = ApiResponse<LoginResponse>,
    PrincipalResponse = ApiResponse<Principal>,
)]
pub struct ApiResponse<T> {
    /// Always true on success
    pub is_success: bool,
    /// HTTP status code set on the response
    pub error_code: u16,
    /// Human-readable summary
    pub message: String,
    /// Response payload
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status(status: StatusCode, data: T) -> Self {
        Self {
            is_success: true,
            error_code: status.as_u16(),
            message: status.canonical_reason().unwrap_or("OK").to_string(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bad_request_serialization() {
        let err = ErrorModel::bad_request(vec![
            "The Name field is required.".to_string(),
            "The Address field is too long.".to_string(),
        ]);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({
                "isSuccess": false,
                "errorCode": 400,
                "message": "Bad Request",
                "data": ["The Name field is required.", "The Address field is too long."]
            })
        );
    }

    #[test]
    fn test_token_validation_failed_omits_data() {
        let json = serde_json::to_string(&ErrorModel::token_validation_failed()).unwrap();
        assert_eq!(
            json,
            r#"{"isSuccess":false,"errorCode":401,"message":"Token Validation Has Failed. Request Access Denied"}"#
        );
    }

    #[test]
    fn test_into_response_status_matches_error_code() {
        for (err, status) in [
            (ErrorModel::bad_request(vec![]), StatusCode::BAD_REQUEST),
            (ErrorModel::token_validation_failed(), StatusCode::UNAUTHORIZED),
            (ErrorModel::not_found("missing"), StatusCode::NOT_FOUND),
            (ErrorModel::conflict("duplicate"), StatusCode::CONFLICT),
            (ErrorModel::payload_too_large("big"), StatusCode::PAYLOAD_TOO_LARGE),
            (ErrorModel::internal_error(), StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let code = err.error_code;
            let response = err.into_response();
            assert_eq!(response.status(), status);
            assert_eq!(response.status().as_u16(), code);
        }
    }

    #[test]
    fn test_created_envelope() {
        let response = ApiResponse::created("x");
        assert_eq!(response.error_code, 201);
        assert_eq!(response.message, "Created");
        assert!(response.is_success);
    }
}
