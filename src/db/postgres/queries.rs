use sqlx::PgPool;
use uuid::Uuid;

use crate::db::backend::RepositoryResult;
use crate::models::{
    ClientDraft, ClientExternal, NewFile, Society, SocietyDraft, StoredFile, User,
};

const SOCIETY_COLUMNS: &str = "id, name, registration_number, address, created_at, updated_at";
const USER_COLUMNS: &str = "id, username, password_hash, security_stamp, created_at";
const FILE_COLUMNS: &str =
    "id, society_id, file_name, content_type, size_bytes, sha256, created_at";
const CLIENT_COLUMNS: &str = "id, client_id, name, callback_url, is_active, created_at";

// ========== SOCIETIES ==========

pub async fn list_societies(pool: &PgPool) -> RepositoryResult<Vec<Society>> {
    let sql = format!("SELECT {} FROM societies ORDER BY name, id", SOCIETY_COLUMNS);
    Ok(sqlx::query_as::<_, Society>(&sql).fetch_all(pool).await?)
}

pub async fn get_society(pool: &PgPool, id: Uuid) -> RepositoryResult<Option<Society>> {
    let sql = format!("SELECT {} FROM societies WHERE id = $1", SOCIETY_COLUMNS);
    Ok(sqlx::query_as::<_, Society>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert_society(pool: &PgPool, draft: &SocietyDraft) -> RepositoryResult<Society> {
    let sql = format!(
        r#"
        INSERT INTO societies (id, name, registration_number, address)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        SOCIETY_COLUMNS
    );
    Ok(sqlx::query_as::<_, Society>(&sql)
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.registration_number)
        .bind(&draft.address)
        .fetch_one(pool)
        .await?)
}

pub async fn update_society(
    pool: &PgPool,
    id: Uuid,
    draft: &SocietyDraft,
) -> RepositoryResult<Option<Society>> {
    let sql = format!(
        r#"
        UPDATE societies
        SET name = $2, registration_number = $3, address = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        SOCIETY_COLUMNS
    );
    Ok(sqlx::query_as::<_, Society>(&sql)
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.registration_number)
        .bind(&draft.address)
        .fetch_optional(pool)
        .await?)
}

pub async fn delete_society(pool: &PgPool, id: Uuid) -> RepositoryResult<bool> {
    let result = sqlx::query("DELETE FROM societies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ========== USERS / SECURITY STAMPS ==========

pub async fn find_user_by_username(pool: &PgPool, username: &str) -> RepositoryResult<Option<User>> {
    let sql = format!(
        "SELECT {} FROM users WHERE LOWER(username) = LOWER($1)",
        USER_COLUMNS
    );
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?)
}

pub async fn get_user(pool: &PgPool, id: Uuid) -> RepositoryResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> RepositoryResult<User> {
    let sql = format!(
        r#"
        INSERT INTO users (id, username, password_hash, security_stamp)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        USER_COLUMNS
    );
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(User::new_security_stamp())
        .fetch_one(pool)
        .await?)
}

pub async fn get_security_stamp(pool: &PgPool, user_id: Uuid) -> RepositoryResult<Option<String>> {
    Ok(
        sqlx::query_scalar::<_, String>("SELECT security_stamp FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn rotate_security_stamp(
    pool: &PgPool,
    user_id: Uuid,
) -> RepositoryResult<Option<String>> {
    Ok(sqlx::query_scalar::<_, String>(
        "UPDATE users SET security_stamp = $2 WHERE id = $1 RETURNING security_stamp",
    )
    .bind(user_id)
    .bind(User::new_security_stamp())
    .fetch_optional(pool)
    .await?)
}

// ========== FILES ==========

pub async fn insert_file(pool: &PgPool, file: &NewFile) -> RepositoryResult<StoredFile> {
    let sql = format!(
        r#"
        INSERT INTO files (id, society_id, file_name, content_type, size_bytes, sha256, content)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        FILE_COLUMNS
    );
    Ok(sqlx::query_as::<_, StoredFile>(&sql)
        .bind(Uuid::new_v4())
        .bind(file.society_id)
        .bind(&file.file_name)
        .bind(&file.content_type)
        .bind(file.size_bytes())
        .bind(&file.sha256)
        .bind(&file.content)
        .fetch_one(pool)
        .await?)
}

pub async fn get_file(pool: &PgPool, id: Uuid) -> RepositoryResult<Option<StoredFile>> {
    let sql = format!("SELECT {} FROM files WHERE id = $1", FILE_COLUMNS);
    Ok(sqlx::query_as::<_, StoredFile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn get_file_content(pool: &PgPool, id: Uuid) -> RepositoryResult<Option<Vec<u8>>> {
    Ok(
        sqlx::query_scalar::<_, Vec<u8>>("SELECT content FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn list_files_by_society(
    pool: &PgPool,
    society_id: Uuid,
) -> RepositoryResult<Vec<StoredFile>> {
    let sql = format!(
        "SELECT {} FROM files WHERE society_id = $1 ORDER BY created_at DESC, id",
        FILE_COLUMNS
    );
    Ok(sqlx::query_as::<_, StoredFile>(&sql)
        .bind(society_id)
        .fetch_all(pool)
        .await?)
}

pub async fn delete_file(pool: &PgPool, id: Uuid) -> RepositoryResult<bool> {
    let result = sqlx::query("DELETE FROM files WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ========== EXTERNAL CLIENTS ==========

pub async fn list_clients(pool: &PgPool) -> RepositoryResult<Vec<ClientExternal>> {
    let sql = format!(
        "SELECT {} FROM client_externals ORDER BY client_id",
        CLIENT_COLUMNS
    );
    Ok(sqlx::query_as::<_, ClientExternal>(&sql)
        .fetch_all(pool)
        .await?)
}

pub async fn find_client(pool: &PgPool, client_id: &str) -> RepositoryResult<Option<ClientExternal>> {
    let sql = format!(
        "SELECT {} FROM client_externals WHERE client_id = $1",
        CLIENT_COLUMNS
    );
    Ok(sqlx::query_as::<_, ClientExternal>(&sql)
        .bind(client_id)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert_client(pool: &PgPool, draft: &ClientDraft) -> RepositoryResult<ClientExternal> {
    let sql = format!(
        r#"
        INSERT INTO client_externals (id, client_id, name, callback_url)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        CLIENT_COLUMNS
    );
    Ok(sqlx::query_as::<_, ClientExternal>(&sql)
        .bind(Uuid::new_v4())
        .bind(&draft.client_id)
        .bind(&draft.name)
        .bind(&draft.callback_url)
        .fetch_one(pool)
        .await?)
}
