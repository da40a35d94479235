//! Request repository
//!
//! Database operations for course site requests. Additional enrollments are
//! stored as a JSONB array, the status as its snake_case name.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crf_core::traits::Id;
use crf_models::{AdditionalEnrollment, Entity, Identifiable, Request, RequestStatus};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::repository::{Pagination, RepositoryError, RepositoryResult};

const REQUEST_COLUMNS: &str = r#"
    id, section_code, requester, proxy_requester, title_override, copy_from_course,
    reserves, lps_online, exclude_announcements, additional_enrollments,
    additional_instructions, status, process_notes, canvas_course_id,
    created_at, updated_at
"#;

/// Request database entity
#[derive(Debug, Clone, FromRow)]
pub struct RequestRow {
    pub id: i64,
    pub section_code: String,
    pub requester: String,
    pub proxy_requester: Option<String>,
    pub title_override: Option<String>,
    pub copy_from_course: Option<i64>,
    pub reserves: bool,
    pub lps_online: bool,
    pub exclude_announcements: bool,
    pub additional_enrollments: Json<Vec<AdditionalEnrollment>>,
    pub additional_instructions: Option<String>,
    pub status: String,
    pub process_notes: Option<String>,
    pub canvas_course_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for Request {
    type Error = RepositoryError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let status: RequestStatus = row.status.parse().map_err(RepositoryError::InvalidData)?;

        Ok(Request {
            id: Some(row.id),
            section_code: row.section_code,
            requester: row.requester,
            proxy_requester: row.proxy_requester,
            title_override: row.title_override,
            copy_from_course: row.copy_from_course,
            reserves: row.reserves,
            lps_online: row.lps_online,
            exclude_announcements: row.exclude_announcements,
            additional_enrollments: row.additional_enrollments.0,
            additional_instructions: row.additional_instructions,
            status,
            process_notes: row.process_notes,
            canvas_course_id: row.canvas_course_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

fn into_requests(rows: Vec<RequestRow>) -> RepositoryResult<Vec<Request>> {
    rows.into_iter().map(Request::try_from).collect()
}

/// Request persistence used by services
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Request>>;

    async fn find_by_section_code(&self, section_code: &str) -> RepositoryResult<Option<Request>>;

    /// All requests, newest first
    async fn find_all(&self, pagination: Pagination) -> RepositoryResult<Vec<Request>>;

    /// Requests submitted by or on behalf of `username`, newest first
    async fn find_for_user(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> RepositoryResult<Vec<Request>>;

    async fn count_all(&self) -> RepositoryResult<i64>;

    /// Number of requests [`RequestStore::find_for_user`] pages through
    async fn count_for_user(&self, username: &str) -> RepositoryResult<i64>;

    async fn create(&self, request: &Request) -> RepositoryResult<Request>;

    /// Overwrite every editable column of request `id`
    async fn update(&self, id: Id, request: &Request) -> RepositoryResult<Request>;

    async fn delete(&self, id: Id) -> RepositoryResult<()>;
}

/// Request repository implementation
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for RequestRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Request>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Request::try_from).transpose()
    }

    async fn find_by_section_code(&self, section_code: &str) -> RepositoryResult<Option<Request>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE section_code = $1",
            REQUEST_COLUMNS
        ))
        .bind(section_code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Request::try_from).transpose()
    }

    async fn find_all(&self, pagination: Pagination) -> RepositoryResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            REQUEST_COLUMNS
        ))
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        into_requests(rows)
    }

    async fn find_for_user(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> RepositoryResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {} FROM requests
            WHERE requester = $1 OR proxy_requester = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            REQUEST_COLUMNS
        ))
        .bind(username)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        into_requests(rows)
    }

    async fn count_all(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM requests")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_for_user(&self, username: &str) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM requests WHERE requester = $1 OR proxy_requester = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn create(&self, request: &Request) -> RepositoryResult<Request> {
        if request.is_persisted() {
            return Err(RepositoryError::InvalidData(format!(
                "{} is already saved",
                Request::TYPE_NAME
            )));
        }

        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            INSERT INTO requests (
                section_code, requester, proxy_requester, title_override, copy_from_course,
                reserves, lps_online, exclude_announcements, additional_enrollments,
                additional_instructions, status, process_notes, canvas_course_id,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW()
            )
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(&request.section_code)
        .bind(&request.requester)
        .bind(&request.proxy_requester)
        .bind(&request.title_override)
        .bind(request.copy_from_course)
        .bind(request.reserves)
        .bind(request.lps_online)
        .bind(request.exclude_announcements)
        .bind(Json(&request.additional_enrollments))
        .bind(&request.additional_instructions)
        .bind(request.status.as_str())
        .bind(&request.process_notes)
        .bind(request.canvas_course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, &format!("Request for {}", request.section_code))
        })?;

        tracing::info!(id = row.id, section_code = %row.section_code, "Request created");
        row.try_into()
    }

    async fn update(&self, id: Id, request: &Request) -> RepositoryResult<Request> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            UPDATE requests SET
                proxy_requester = $1,
                title_override = $2,
                copy_from_course = $3,
                reserves = $4,
                lps_online = $5,
                exclude_announcements = $6,
                additional_enrollments = $7,
                additional_instructions = $8,
                status = $9,
                process_notes = $10,
                canvas_course_id = $11,
                updated_at = NOW()
            WHERE id = $12
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(&request.proxy_requester)
        .bind(&request.title_override)
        .bind(request.copy_from_course)
        .bind(request.reserves)
        .bind(request.lps_online)
        .bind(request.exclude_announcements)
        .bind(Json(&request.additional_enrollments))
        .bind(&request.additional_instructions)
        .bind(request.status.as_str())
        .bind(&request.process_notes)
        .bind(request.canvas_course_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("{} with id {} not found", Request::TYPE_NAME, id))
        })?;

        row.try_into()
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Request with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
