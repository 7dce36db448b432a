use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "postgres")]
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::not_blank;

/// Metadata of an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres", derive(FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: Uuid,
    /// Owning society, if any
    pub society_id: Option<Uuid>,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Hex-encoded SHA-256 of the content
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

/// Upload request body; content travels base64-encoded
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadFileRequest {
    pub society_id: Option<Uuid>,
    #[validate(
        custom(function = "not_blank", message = "The FileName field is required."),
        length(
            max = 255,
            message = "The field FileName must be a string with a maximum length of 255."
        )
    )]
    pub file_name: String,
    #[validate(length(
        max = 127,
        message = "The field ContentType must be a string with a maximum length of 127."
    ))]
    pub content_type: Option<String>,
    #[validate(custom(function = "not_blank", message = "The ContentBase64 field is required."))]
    pub content_base64: String,
}

/// File ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewFile {
    pub society_id: Option<Uuid>,
    pub file_name: String,
    pub content_type: String,
    pub sha256: String,
    pub content: Vec<u8>,
}

impl NewFile {
    pub const DEFAULT_CONTENT_TYPE: &'static str = "application/octet-stream";

    pub fn new(
        society_id: Option<Uuid>,
        file_name: &str,
        content_type: Option<&str>,
        content: Vec<u8>,
    ) -> Self {
        let content_type = content_type
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(Self::DEFAULT_CONTENT_TYPE)
            .to_string();

        Self {
            society_id,
            file_name: file_name.trim().to_string(),
            content_type,
            sha256: crate::utils::hash::sha256_hex(&content),
            content,
        }
    }

    pub fn size_bytes(&self) -> i64 {
        self.content.len() as i64
    }
}
