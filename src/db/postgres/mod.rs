pub mod connection;
pub mod queries;

use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::Instant;
use uuid::Uuid;

pub use connection::ConnectionContext;

use crate::db::backend::{
    ClientExternalRepository, FileRepository, RepositoryResult, SocietyRepository,
    TokenRepository,
};
use crate::metrics::registry::{DATABASE_QUERIES_TOTAL, DATABASE_QUERY_DURATION_SECONDS};
use crate::models::{
    ClientDraft, ClientExternal, NewFile, Society, SocietyDraft, StoredFile, User,
};

/// Record query count and duration around a repository call.
async fn observed<T, F>(query_type: &'static str, query: F) -> RepositoryResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    let start = Instant::now();
    let res = query.await;
    DATABASE_QUERIES_TOTAL
        .with_label_values(&[query_type])
        .inc();
    DATABASE_QUERY_DURATION_SECONDS
        .with_label_values(&[query_type])
        .observe(start.elapsed().as_secs_f64());
    res
}

pub struct PostgresSocietyRepository {
    pool: PgPool,
}

impl PostgresSocietyRepository {
    pub fn new(context: &ConnectionContext) -> Self {
        Self {
            pool: context.pool().clone(),
        }
    }
}

#[async_trait]
impl SocietyRepository for PostgresSocietyRepository {
    async fn list(&self) -> RepositoryResult<Vec<Society>> {
        observed("select", queries::list_societies(&self.pool)).await
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<Society>> {
        observed("select", queries::get_society(&self.pool, id)).await
    }

    async fn create(&self, draft: SocietyDraft) -> RepositoryResult<Society> {
        observed("insert", queries::insert_society(&self.pool, &draft)).await
    }

    async fn update(&self, id: Uuid, draft: SocietyDraft) -> RepositoryResult<Option<Society>> {
        observed("update", queries::update_society(&self.pool, id, &draft)).await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        observed("delete", queries::delete_society(&self.pool, id)).await
    }
}

pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub fn new(context: &ConnectionContext) -> Self {
        Self {
            pool: context.pool().clone(),
        }
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        observed("select", queries::find_user_by_username(&self.pool, username)).await
    }

    async fn get_user(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        observed("select", queries::get_user(&self.pool, id)).await
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> RepositoryResult<User> {
        observed(
            "insert",
            queries::insert_user(&self.pool, username, password_hash),
        )
        .await
    }

    async fn security_stamp(&self, user_id: Uuid) -> RepositoryResult<Option<String>> {
        observed("select", queries::get_security_stamp(&self.pool, user_id)).await
    }

    async fn update_security_stamp(&self, user_id: Uuid) -> RepositoryResult<Option<String>> {
        observed("update", queries::rotate_security_stamp(&self.pool, user_id)).await
    }
}

pub struct PostgresFileRepository {
    pool: PgPool,
}

impl PostgresFileRepository {
    pub fn new(context: &ConnectionContext) -> Self {
        Self {
            pool: context.pool().clone(),
        }
    }
}

#[async_trait]
impl FileRepository for PostgresFileRepository {
    async fn save(&self, file: NewFile) -> RepositoryResult<StoredFile> {
        observed("insert", queries::insert_file(&self.pool, &file)).await
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<StoredFile>> {
        observed("select", queries::get_file(&self.pool, id)).await
    }

    async fn content(&self, id: Uuid) -> RepositoryResult<Option<Vec<u8>>> {
        observed("select", queries::get_file_content(&self.pool, id)).await
    }

    async fn list_by_society(&self, society_id: Uuid) -> RepositoryResult<Vec<StoredFile>> {
        observed(
            "select",
            queries::list_files_by_society(&self.pool, society_id),
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        observed("delete", queries::delete_file(&self.pool, id)).await
    }
}

pub struct PostgresClientExternalRepository {
    pool: PgPool,
}

impl PostgresClientExternalRepository {
    pub fn new(context: &ConnectionContext) -> Self {
        Self {
            pool: context.pool().clone(),
        }
    }
}

#[async_trait]
impl ClientExternalRepository for PostgresClientExternalRepository {
    async fn list(&self) -> RepositoryResult<Vec<ClientExternal>> {
        observed("select", queries::list_clients(&self.pool)).await
    }

    async fn find_by_client_id(&self, client_id: &str) -> RepositoryResult<Option<ClientExternal>> {
        observed("select", queries::find_client(&self.pool, client_id)).await
    }

    async fn register(&self, draft: ClientDraft) -> RepositoryResult<ClientExternal> {
        observed("insert", queries::insert_client(&self.pool, &draft)).await
    }
}
