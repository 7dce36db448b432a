use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use super::claims::Claims;
use super::handler::AuthFailure;
use crate::db::{RepositoryResult, TokenRepository};

/// Outcome of a security stamp check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampCheck {
    /// Token is younger than the validation interval
    Skipped,
    Valid,
    Rejected(AuthFailure),
}

/// Re-checks the token's security stamp against the user's current one.
///
/// With a zero interval every authenticated request hits the store, so a
/// stamp rotation takes effect on the very next request.
#[derive(Debug, Clone)]
pub struct SecurityStampValidator {
    validation_interval: Duration,
}

impl Default for SecurityStampValidator {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl SecurityStampValidator {
    pub fn new(validation_interval: Duration) -> Self {
        Self {
            validation_interval,
        }
    }

    pub fn validation_interval(&self) -> Duration {
        self.validation_interval
    }

    pub async fn validate(
        &self,
        claims: &Claims,
        store: &dyn TokenRepository,
        now: DateTime<Utc>,
    ) -> RepositoryResult<StampCheck> {
        let elapsed = claims
            .issued_at()
            .and_then(|issued| (now - issued).to_std().ok())
            .unwrap_or(Duration::ZERO);
        if elapsed < self.validation_interval {
            return Ok(StampCheck::Skipped);
        }

        let user_id = match claims.user_id() {
            Ok(id) => id,
            Err(_) => return Ok(StampCheck::Rejected(AuthFailure::UnknownUser)),
        };

        match store.security_stamp(user_id).await? {
            Some(current) if current == claims.ss => Ok(StampCheck::Valid),
            Some(_) => {
                debug!(user_id = %user_id, "Security stamp changed since token was issued");
                Ok(StampCheck::Rejected(AuthFailure::SecurityStampMismatch))
            }
            None => Ok(StampCheck::Rejected(AuthFailure::UnknownUser)),
        }
    }
}
