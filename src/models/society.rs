use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "postgres")]
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::not_blank;

/// A registered society
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres", derive(FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Society {
    pub id: Uuid,
    pub name: String,
    /// Unique registration number
    pub registration_number: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of society create and update requests
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SocietyRequest {
    #[validate(
        custom(function = "not_blank", message = "The Name field is required."),
        length(
            max = 200,
            message = "The field Name must be a string with a maximum length of 200."
        )
    )]
    pub name: String,
    #[validate(
        custom(
            function = "not_blank",
            message = "The RegistrationNumber field is required."
        ),
        length(
            max = 50,
            message = "The field RegistrationNumber must be a string with a maximum length of 50."
        )
    )]
    pub registration_number: String,
    #[validate(length(
        max = 500,
        message = "The field Address must be a string with a maximum length of 500."
    ))]
    pub address: Option<String>,
}

/// Validated society fields handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct SocietyDraft {
    pub name: String,
    pub registration_number: String,
    pub address: Option<String>,
}

impl From<SocietyRequest> for SocietyDraft {
    fn from(request: SocietyRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            registration_number: request.registration_number.trim().to_string(),
            address: request
                .address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        }
    }
}
