//! User repository
//!
//! Database operations for users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crf_models::{Entity, User};
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

const USER_COLUMNS: &str =
    "id, username, first_name, last_name, email, is_staff, canvas_id, created_at, updated_at";

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub canvas_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: Some(row.id),
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_staff: row.is_staff,
            canvas_id: row.canvas_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// User persistence used by services
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    /// Users with the given usernames, in no particular order
    async fn find_many_by_username(&self, usernames: &[String]) -> RepositoryResult<Vec<User>>;

    /// Fetch the user, creating a bare record on first sign-in
    async fn ensure(&self, username: &str) -> RepositoryResult<User>;

    async fn update_email(&self, username: &str, email: &str) -> RepositoryResult<User>;

    async fn set_canvas_id(&self, username: &str, canvas_id: i64) -> RepositoryResult<()>;
}

/// User repository implementation
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_many_by_username(&self, usernames: &[String]) -> RepositoryResult<Vec<User>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = ANY($1)",
            USER_COLUMNS
        ))
        .bind(usernames)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn ensure(&self, username: &str) -> RepositoryResult<User> {
        // The no-op update makes RETURNING yield the existing row too
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, created_at, updated_at)
            VALUES ($1, NOW(), NOW())
            ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_email(&self, username: &str, email: &str) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET email = $1, updated_at = NOW() WHERE username = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("{} {} not found", User::TYPE_NAME, username))
        })?;

        tracing::debug!(username, "Updated user email");
        Ok(row.into())
    }

    async fn set_canvas_id(&self, username: &str, canvas_id: i64) -> RepositoryResult<()> {
        let result =
            sqlx::query("UPDATE users SET canvas_id = $1, updated_at = NOW() WHERE username = $2")
                .bind(canvas_id)
                .bind(username)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "User {} not found",
                username
            )));
        }
        Ok(())
    }
}
