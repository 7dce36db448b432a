use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    ClientDraft, ClientExternal, NewFile, Society, SocietyDraft, StoredFile, User,
};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict(db_err.message().to_string());
            }
        }
        Self::Database(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The database context: connectivity checks for the backing store
#[async_trait]
pub trait DatabaseContext: Send + Sync {
    /// Test database connection
    async fn test_connection(&self) -> RepositoryResult<()>;

    /// Backend name for health output
    fn backend_name(&self) -> &'static str;
}

/// Societies registry
#[async_trait]
pub trait SocietyRepository: Send + Sync {
    /// List all societies ordered by name
    async fn list(&self) -> RepositoryResult<Vec<Society>>;

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<Society>>;

    /// Fails with `Conflict` when the registration number is taken
    async fn create(&self, draft: SocietyDraft) -> RepositoryResult<Society>;

    /// Replace all editable fields; `None` when the society does not exist
    async fn update(&self, id: Uuid, draft: SocietyDraft) -> RepositoryResult<Option<Society>>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}

/// Users, credentials and security stamps backing token issuance
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    async fn get_user(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Fails with `Conflict` when the username is taken
    async fn create_user(&self, username: &str, password_hash: &str) -> RepositoryResult<User>;

    /// Current security stamp of a user, `None` when the user does not exist
    async fn security_stamp(&self, user_id: Uuid) -> RepositoryResult<Option<String>>;

    /// Replace the stamp with a fresh one, invalidating every issued token
    async fn update_security_stamp(&self, user_id: Uuid) -> RepositoryResult<Option<String>>;
}

/// Uploaded files and their content
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn save(&self, file: NewFile) -> RepositoryResult<StoredFile>;

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<StoredFile>>;

    async fn content(&self, id: Uuid) -> RepositoryResult<Option<Vec<u8>>>;

    /// Files of one society, newest first
    async fn list_by_society(&self, society_id: Uuid) -> RepositoryResult<Vec<StoredFile>>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}

/// External integration clients
#[async_trait]
pub trait ClientExternalRepository: Send + Sync {
    /// List all clients ordered by client id
    async fn list(&self) -> RepositoryResult<Vec<ClientExternal>>;

    async fn find_by_client_id(&self, client_id: &str) -> RepositoryResult<Option<ClientExternal>>;

    /// Fails with `Conflict` when the client id is taken
    async fn register(&self, draft: ClientDraft) -> RepositoryResult<ClientExternal>;
}
