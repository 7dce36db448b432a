use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

/// Issuer and audience literal expected on every bearer token.
pub const DEFAULT_TOKEN_ISSUER: &str = "apiWithAuthBackend";

/// Minimum secret length accepted for the HS256 signing key (256 bits).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// One year.
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 525_600;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub security_stamp: SecurityStampConfig,
    pub files: FileConfig,
    pub seed_user: Option<SeedUserConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_lifetime_minutes: i64,
}

// Keep the secret out of debug logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_lifetime_minutes", &self.token_lifetime_minutes)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SecurityStampConfig {
    /// Zero means every authenticated request re-checks the stamp.
    pub validation_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct FileConfig {
    pub max_size_bytes: usize,
}

#[derive(Clone)]
pub struct SeedUserConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SeedUserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUserConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'", other),
        };

        let database_url = match backend {
            StorageBackend::Postgres => {
                env::var("DATABASE_URL").context("DATABASE_URL must be set")?
            }
            StorageBackend::Memory => env::var("DATABASE_URL").unwrap_or_default(),
        };

        let jwt = JwtConfig {
            secret: env::var("JWT__SECRET").context("JWT__SECRET must be set")?,
            issuer: env::var("JWT__ISSUER").unwrap_or_else(|_| DEFAULT_TOKEN_ISSUER.to_string()),
            audience: env::var("JWT__AUDIENCE")
                .unwrap_or_else(|_| DEFAULT_TOKEN_ISSUER.to_string()),
            token_lifetime_minutes: env::var("JWT__TOKEN_LIFETIME_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("JWT__TOKEN_LIFETIME_MINUTES must be a valid number")?,
        };
        jwt.validate()?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
                acquire_timeout_ms: env::var("DATABASE_ACQUIRE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "30000".to_string())
                    .parse()
                    .context("DATABASE_ACQUIRE_TIMEOUT_MS must be a valid number")?,
            },
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                instance_id: env::var("INSTANCE_ID")
                    .or_else(|_| env::var("HOSTNAME"))
                    .unwrap_or_else(|_| "unknown".to_string()),
            },
            jwt,
            security_stamp: SecurityStampConfig {
                validation_interval: Duration::from_secs(
                    env::var("SECURITY_STAMP_VALIDATION_INTERVAL_SECONDS")
                        .unwrap_or_else(|_| "0".to_string())
                        .parse()
                        .context(
                            "SECURITY_STAMP_VALIDATION_INTERVAL_SECONDS must be a valid number",
                        )?,
                ),
            },
            files: FileConfig {
                max_size_bytes: env::var("FILE_MAX_SIZE_BYTES")
                    .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                    .parse()
                    .context("FILE_MAX_SIZE_BYTES must be a valid number")?,
            },
            seed_user: Self::seed_user_from_env(),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn seed_user_from_env() -> Option<SeedUserConfig> {
        // Seeding is optional - only when both variables are present
        let username = env::var("ADMIN_USERNAME").ok()?;
        let password = env::var("ADMIN_PASSWORD").ok()?;
        if username.trim().is_empty() || password.is_empty() {
            return None;
        }
        Some(SeedUserConfig { username, password })
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<()> {
        if self.secret.len() < MIN_JWT_SECRET_BYTES {
            bail!(
                "JWT__SECRET must be at least {} bytes long",
                MIN_JWT_SECRET_BYTES
            );
        }
        if self.token_lifetime_minutes <= 0 {
            bail!("JWT__TOKEN_LIFETIME_MINUTES must be positive");
        }
        if self.token_lifetime_minutes > MAX_TOKEN_LIFETIME_MINUTES {
            bail!(
                "JWT__TOKEN_LIFETIME_MINUTES must not exceed {}",
                MAX_TOKEN_LIFETIME_MINUTES
            );
        }
        Ok(())
    }
}
