use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token::TokenError;
use crate::models::Principal;

/// Claims carried by every bearer token issued by this API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Username
    pub unique_name: String,
    /// Security stamp of the user at issue time
    pub ss: String,
    /// Token id
    pub jti: String,
    pub iss: String,
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| TokenError::Malformed("subject is not a user id".to_string()))
    }

    pub fn principal(&self) -> Result<Principal, TokenError> {
        let out_of_range = || TokenError::Malformed("timestamp out of range".to_string());
        Ok(Principal {
            user_id: self.user_id()?,
            username: self.unique_name.clone(),
            issued_at: self.issued_at().ok_or_else(out_of_range)?,
            expires_at: self.expires_at().ok_or_else(out_of_range)?,
        })
    }
}
