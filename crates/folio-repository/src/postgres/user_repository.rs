//! PostgreSQL user repository implementation.

use crate::{traits::UserRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{Email, FolioResult, Page, PageRequest, User, UserId};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// PostgreSQL user repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = UserRepository)]
pub struct PgUserRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgUserRepository {
    /// Creates a new PostgreSQL user repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    full_name: Option<String>,
    bio: Option<String>,
    is_active: bool,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: Email::new_unchecked(row.email),
            password_hash: row.password_hash,
            full_name: row.full_name,
            bio: row.bio,
            is_active: row.is_active,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.full_name, u.bio, \
     u.is_active, u.is_admin, u.created_at, u.updated_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> FolioResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> FolioResult<Option<User>> {
        debug!("Finding user by username: {}", username);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> FolioResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE LOWER(u.email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(User::from))
    }

    async fn exists_by_username(&self, username: &str) -> FolioResult<bool> {
        let result: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE username = $1 LIMIT 1")
            .bind(username)
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(result.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> FolioResult<bool> {
        let result: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1")
                .bind(email)
                .fetch_optional(self.pool.inner())
                .await?;

        Ok(result.is_some())
    }

    async fn find_all(&self, page: PageRequest) -> FolioResult<Page<User>> {
        debug!("Finding all users, page: {}, size: {}", page.page, page.size);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool.inner())
            .await?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u ORDER BY u.username LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit()))
        .bind(i64::from(page.offset()))
        .fetch_all(self.pool.inner())
        .await?;

        let users = rows.into_iter().map(User::from).collect();
        Ok(Page::new(users, page, u64::try_from(total).unwrap_or_default()))
    }

    async fn save(&self, user: &User) -> FolioResult<User> {
        debug!("Saving user: {}", user.username);

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, full_name, bio,
                               is_active, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.bio)
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> FolioResult<User> {
        debug!("Updating user: {}", user.id);

        sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, full_name = $5, bio = $6,
                is_active = $7, is_admin = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.bio)
        .bind(user.is_active)
        .bind(user.is_admin)
        .bind(user.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> FolioResult<bool> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
