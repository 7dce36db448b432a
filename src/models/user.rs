use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "postgres")]
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::not_blank;

/// An API user. Never serialized: it carries the password hash.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "postgres", derive(FromRow))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    /// Rotated on every credential-affecting change
    pub security_stamp: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new_security_stamp() -> String {
        Uuid::new_v4().simple().to_string().to_uppercase()
    }
}

/// Login request body
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    #[validate(custom(function = "not_blank", message = "The Username field is required."))]
    pub username: String,
    #[validate(custom(function = "not_blank", message = "The Password field is required."))]
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Always "Bearer"
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated caller, as seen by handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
