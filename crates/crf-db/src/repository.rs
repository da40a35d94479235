//! Repository errors and shared query types

use crf_core::CrfError;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Map unique-constraint violations to `Conflict`
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(format!("{} already exists", what))
            }
            _ => RepositoryError::Database(err),
        }
    }
}

impl From<RepositoryError> for CrfError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(message) => CrfError::NotFound {
                entity: "record",
                field: "id",
                value: message,
            },
            RepositoryError::Conflict(message) => {
                let mut errors = crf_core::ValidationErrors::new();
                errors.add_base(message);
                CrfError::Validation(errors)
            }
            other => CrfError::Database(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Pagination parameters for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            offset: offset.max(0),
        }
    }

    pub fn page(page: i64, per_page: i64) -> Self {
        let per_page = per_page.clamp(1, Self::MAX_LIMIT);
        Self::new(per_page, (page.max(1) - 1) * per_page)
    }
}
