//! In-memory repositories, used by tests and `STORAGE_BACKEND=memory` runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::backend::{
    ClientExternalRepository, DatabaseContext, FileRepository, RepositoryError, RepositoryResult,
    SocietyRepository, TokenRepository,
};
use crate::models::{
    ClientDraft, ClientExternal, NewFile, Society, SocietyDraft, StoredFile, User,
};

#[derive(Debug, Default)]
pub struct InMemoryContext;

#[async_trait]
impl DatabaseContext for InMemoryContext {
    async fn test_connection(&self) -> RepositoryResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Default)]
pub struct InMemorySocietyRepository {
    societies: RwLock<HashMap<Uuid, Society>>,
    files: Option<Arc<InMemoryFileRepository>>,
}

impl InMemorySocietyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deleting a society detaches its files in `files`, like the
    /// `ON DELETE SET NULL` foreign key does in PostgreSQL.
    pub fn with_files(files: Arc<InMemoryFileRepository>) -> Self {
        Self {
            societies: RwLock::default(),
            files: Some(files),
        }
    }
}

fn registration_taken(
    societies: &HashMap<Uuid, Society>,
    registration_number: &str,
    except: Option<Uuid>,
) -> bool {
    societies
        .values()
        .any(|s| s.registration_number == registration_number && Some(s.id) != except)
}

#[async_trait]
impl SocietyRepository for InMemorySocietyRepository {
    async fn list(&self) -> RepositoryResult<Vec<Society>> {
        let mut societies: Vec<Society> = self.societies.read().await.values().cloned().collect();
        societies.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(societies)
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<Society>> {
        Ok(self.societies.read().await.get(&id).cloned())
    }

    async fn create(&self, draft: SocietyDraft) -> RepositoryResult<Society> {
        let mut societies = self.societies.write().await;
        if registration_taken(&societies, &draft.registration_number, None) {
            return Err(RepositoryError::Conflict(format!(
                "Registration number already exists: {}",
                draft.registration_number
            )));
        }

        let now = Utc::now();
        let society = Society {
            id: Uuid::new_v4(),
            name: draft.name,
            registration_number: draft.registration_number,
            address: draft.address,
            created_at: now,
            updated_at: now,
        };
        societies.insert(society.id, society.clone());
        Ok(society)
    }

    async fn update(&self, id: Uuid, draft: SocietyDraft) -> RepositoryResult<Option<Society>> {
        let mut societies = self.societies.write().await;
        if !societies.contains_key(&id) {
            return Ok(None);
        }
        if registration_taken(&societies, &draft.registration_number, Some(id)) {
            return Err(RepositoryError::Conflict(format!(
                "Registration number already exists: {}",
                draft.registration_number
            )));
        }

        let Some(society) = societies.get_mut(&id) else {
            return Ok(None);
        };
        society.name = draft.name;
        society.registration_number = draft.registration_number;
        society.address = draft.address;
        society.updated_at = Utc::now();
        Ok(Some(society.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let removed = self.societies.write().await.remove(&id).is_some();
        if removed {
            if let Some(files) = &self.files {
                files.detach_society(id).await;
            }
        }
        Ok(removed)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn get_user(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> RepositoryResult<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(RepositoryError::Conflict(format!(
                "Username already exists: {}",
                username
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            security_stamp: User::new_security_stamp(),
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn security_stamp(&self, user_id: Uuid) -> RepositoryResult<Option<String>> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .map(|u| u.security_stamp.clone()))
    }

    async fn update_security_stamp(&self, user_id: Uuid) -> RepositoryResult<Option<String>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&user_id).map(|user| {
            user.security_stamp = User::new_security_stamp();
            user.security_stamp.clone()
        }))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFileRepository {
    files: RwLock<HashMap<Uuid, (StoredFile, Vec<u8>)>>,
}

impl InMemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn detach_society(&self, society_id: Uuid) {
        for (meta, _) in self.files.write().await.values_mut() {
            if meta.society_id == Some(society_id) {
                meta.society_id = None;
            }
        }
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn save(&self, file: NewFile) -> RepositoryResult<StoredFile> {
        let stored = StoredFile {
            id: Uuid::new_v4(),
            society_id: file.society_id,
            size_bytes: file.size_bytes(),
            file_name: file.file_name,
            content_type: file.content_type,
            sha256: file.sha256,
            created_at: Utc::now(),
        };
        self.files
            .write()
            .await
            .insert(stored.id, (stored.clone(), file.content));
        Ok(stored)
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<StoredFile>> {
        Ok(self.files.read().await.get(&id).map(|(meta, _)| meta.clone()))
    }

    async fn content(&self, id: Uuid) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(self
            .files
            .read()
            .await
            .get(&id)
            .map(|(_, content)| content.clone()))
    }

    async fn list_by_society(&self, society_id: Uuid) -> RepositoryResult<Vec<StoredFile>> {
        let mut files: Vec<StoredFile> = self
            .files
            .read()
            .await
            .values()
            .filter(|(meta, _)| meta.society_id == Some(society_id))
            .map(|(meta, _)| meta.clone())
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(files)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.files.write().await.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryClientExternalRepository {
    clients: RwLock<Vec<ClientExternal>>,
}

impl InMemoryClientExternalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientExternalRepository for InMemoryClientExternalRepository {
    async fn list(&self) -> RepositoryResult<Vec<ClientExternal>> {
        let mut clients = self.clients.read().await.clone();
        clients.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        Ok(clients)
    }

    async fn find_by_client_id(&self, client_id: &str) -> RepositoryResult<Option<ClientExternal>> {
        Ok(self
            .clients
            .read()
            .await
            .iter()
            .find(|c| c.client_id == client_id)
            .cloned())
    }

    async fn register(&self, draft: ClientDraft) -> RepositoryResult<ClientExternal> {
        let mut clients = self.clients.write().await;
        if clients.iter().any(|c| c.client_id == draft.client_id) {
            return Err(RepositoryError::Conflict(format!(
                "Client id already exists: {}",
                draft.client_id
            )));
        }

        let client = ClientExternal {
            id: Uuid::new_v4(),
            client_id: draft.client_id,
            name: draft.name,
            callback_url: draft.callback_url,
            is_active: true,
            created_at: Utc::now(),
        };
        clients.push(client.clone());
        Ok(client)
    }
}
