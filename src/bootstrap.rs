//! Service registration: binds the repositories, the bearer authentication
//! pipeline and the upload limits into the shared application state.

use anyhow::{Context, Result};
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use crate::api::handlers::{AppState, AppStateInner};
use crate::auth::{
    hash_password, ApiBearerEvents, JwtBearerHandler, SecurityStampValidator, TokenIssuer,
    TokenValidationParameters,
};
use crate::config::{Config, SeedUserConfig};
use crate::db::{self, Repositories, RepositoryError, TokenRepository};

/// Connect the configured backend and build the application state.
pub async fn build_app_state(config: &Config) -> Result<AppState> {
    let repositories = db::init_repositories(&config.database)
        .await
        .context("Failed to initialize repositories")?;

    build_app_state_with(config, repositories).await
}

/// Build the application state over already constructed repositories.
pub async fn build_app_state_with(config: &Config, repositories: Repositories) -> Result<AppState> {
    config.jwt.validate()?;
    let lifetime = Duration::try_minutes(config.jwt.token_lifetime_minutes)
        .context("JWT__TOKEN_LIFETIME_MINUTES is out of range")?;
    let parameters = TokenValidationParameters::from_config(&config.jwt);
    let token_issuer = TokenIssuer::new(&parameters, lifetime);
    let stamp_validator = SecurityStampValidator::new(config.security_stamp.validation_interval);
    info!(
        issuer = %parameters.valid_issuer,
        audience = %parameters.valid_audience,
        stamp_interval_secs = stamp_validator.validation_interval().as_secs(),
        "JWT bearer authentication configured"
    );
    let auth = JwtBearerHandler::new(parameters, stamp_validator, Arc::new(ApiBearerEvents));

    if let Some(seed) = &config.seed_user {
        seed_user(repositories.tokens.as_ref(), seed)
            .await
            .context("Failed to seed the initial user")?;
    }

    let Repositories {
        database,
        societies,
        tokens,
        files,
        clients,
    } = repositories;

    Ok(Arc::new(AppStateInner {
        database,
        societies,
        tokens,
        files,
        clients,
        auth,
        token_issuer,
        max_file_size: config.files.max_size_bytes,
        instance_id: config.server.instance_id.clone(),
    }))
}

/// Create the configured user unless it already exists.
pub async fn seed_user(tokens: &dyn TokenRepository, seed: &SeedUserConfig) -> Result<()> {
    let username = seed.username.trim();
    if tokens.find_user_by_username(username).await?.is_some() {
        info!(username = %username, "Seed user already present");
        return Ok(());
    }

    let hash = hash_password(&seed.password)?;
    match tokens.create_user(username, &hash).await {
        Ok(user) => {
            info!(user_id = %user.id, username = %username, "Seed user created");
            Ok(())
        }
        // Another instance won the race
        Err(RepositoryError::Conflict(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryTokenRepository;

    #[tokio::test]
    async fn test_seed_user_is_idempotent() {
        let tokens = InMemoryTokenRepository::new();
        let seed = SeedUserConfig {
            username: "admin".to_string(),
            password: "correct-horse-battery".to_string(),
        };

        seed_user(&tokens, &seed).await.unwrap();
        let first = tokens.find_user_by_username("admin").await.unwrap().unwrap();
        seed_user(&tokens, &seed).await.unwrap();
        let second = tokens.find_user_by_username("admin").await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert!(crate::auth::verify_password("correct-horse-battery", &second.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_seed_user_rejects_short_password() {
        let tokens = InMemoryTokenRepository::new();
        let seed = SeedUserConfig {
            username: "admin".to_string(),
            password: "short".to_string(),
        };
        assert!(seed_user(&tokens, &seed).await.is_err());
    }
}
