use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "postgres")]
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::not_blank;

/// An external client allowed to integrate with the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres", derive(FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ClientExternal {
    pub id: Uuid,
    /// Public client identifier, unique
    pub client_id: String,
    pub name: String,
    pub callback_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterClientRequest {
    #[validate(
        custom(function = "not_blank", message = "The ClientId field is required."),
        length(
            max = 100,
            message = "The field ClientId must be a string with a maximum length of 100."
        )
    )]
    pub client_id: String,
    #[validate(
        custom(function = "not_blank", message = "The Name field is required."),
        length(
            max = 200,
            message = "The field Name must be a string with a maximum length of 200."
        )
    )]
    pub name: String,
    #[validate(url(
        message = "The CallbackUrl field is not a valid fully-qualified http, https, or ftp URL."
    ))]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientDraft {
    pub client_id: String,
    pub name: String,
    pub callback_url: Option<String>,
}

impl From<RegisterClientRequest> for ClientDraft {
    fn from(request: RegisterClientRequest) -> Self {
        Self {
            client_id: request.client_id.trim().to_string(),
            name: request.name.trim().to_string(),
            callback_url: request.callback_url,
        }
    }
}
