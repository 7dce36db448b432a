pub mod backend;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub mod schema;

use anyhow::Result;
use std::sync::Arc;

pub use backend::{
    ClientExternalRepository, DatabaseContext, FileRepository, RepositoryError,
    RepositoryResult, SocietyRepository, TokenRepository,
};

#[cfg(feature = "postgres")]
pub use postgres::ConnectionContext;

use crate::config::{DatabaseConfig, StorageBackend};

/// The database context and the four repositories bound to one backend.
///
/// Every repository is shared across requests behind an `Arc`; the
/// implementations hold only a pool handle or their own lock.
#[derive(Clone)]
pub struct Repositories {
    pub database: Arc<dyn DatabaseContext>,
    pub societies: Arc<dyn SocietyRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub files: Arc<dyn FileRepository>,
    pub clients: Arc<dyn ClientExternalRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let files = Arc::new(memory::InMemoryFileRepository::new());
        Self {
            database: Arc::new(memory::InMemoryContext),
            societies: Arc::new(memory::InMemorySocietyRepository::with_files(files.clone())),
            tokens: Arc::new(memory::InMemoryTokenRepository::new()),
            files,
            clients: Arc::new(memory::InMemoryClientExternalRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(context: ConnectionContext) -> Self {
        Self {
            societies: Arc::new(postgres::PostgresSocietyRepository::new(&context)),
            tokens: Arc::new(postgres::PostgresTokenRepository::new(&context)),
            files: Arc::new(postgres::PostgresFileRepository::new(&context)),
            clients: Arc::new(postgres::PostgresClientExternalRepository::new(&context)),
            database: Arc::new(context),
        }
    }
}

/// Initialize the configured backend and bind the repositories to it
pub async fn init_repositories(config: &DatabaseConfig) -> Result<Repositories> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            Ok(Repositories::in_memory())
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres => {
            tracing::info!("Initializing PostgreSQL backend");
            let context = ConnectionContext::connect(config).await?;
            context.test_connection().await?;
            schema::run_migrations(context.pool()).await?;
            Ok(Repositories::postgres(context))
        }
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("STORAGE_BACKEND=postgres requires the 'postgres' feature")
        }
    }
}
