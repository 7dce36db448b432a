use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

/// Idempotent schema bootstrap, applied in order on startup.
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS societies (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        registration_number TEXT NOT NULL UNIQUE,
        address TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_societies_name ON societies(name)",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        security_stamp TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username_lower ON users(LOWER(username))",
    r#"
    CREATE TABLE IF NOT EXISTS files (
        id UUID PRIMARY KEY,
        society_id UUID REFERENCES societies(id) ON DELETE SET NULL,
        file_name TEXT NOT NULL,
        content_type TEXT NOT NULL,
        size_bytes BIGINT NOT NULL,
        sha256 TEXT NOT NULL,
        content BYTEA NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_files_society_id ON files(society_id)",
    r#"
    CREATE TABLE IF NOT EXISTS client_externals (
        id UUID PRIMARY KEY,
        client_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        callback_url TEXT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    for (i, statement) in SCHEMA_STATEMENTS.iter().enumerate() {
        let trimmed = statement.trim();
        sqlx::query(trimmed)
            .execute(pool)
            .await
            .with_context(|| {
                format!(
                    "Failed to execute migration statement {}: {}",
                    i + 1,
                    &trimmed[..trimmed.len().min(100)]
                )
            })?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_idempotent() {
        for statement in SCHEMA_STATEMENTS {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "not idempotent: {}",
                statement
            );
        }
    }
}
