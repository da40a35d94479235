//! Axum extractors for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use crf_auth::{Authenticator, CurrentUser};
use crf_canvas::CanvasService;
use crf_core::config::AppConfig;
use crf_db::{RequestStore, UserStore};
use serde::Deserialize;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Authenticator,
    pub canvas: Arc<CanvasService>,
    pub users: Arc<dyn UserStore>,
    pub requests: Arc<dyn RequestStore>,
}

impl AppState {
    /// State whose authenticator resolves users through `users`
    pub fn new(
        config: AppConfig,
        canvas: Arc<CanvasService>,
        users: Arc<dyn UserStore>,
        requests: Arc<dyn RequestStore>,
    ) -> Self {
        let auth = Authenticator::new(config.auth.remote_user_header.clone(), Some(users.clone()));
        Self {
            config: Arc::new(config),
            auth,
            canvas,
            users,
            requests,
        }
    }
}

/// Authenticated user extractor
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user = app_state.auth.authenticate(&parts.headers).await?;
        Ok(AuthenticatedUser(user))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    crf_db::Pagination::DEFAULT_LIMIT
}

pub struct Pagination(pub crf_db::Pagination);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Pagination(crf_db::Pagination::page(
            params.page,
            params.per_page,
        )))
    }
}

#[derive(Debug, Default, Deserialize)]
struct InstructorsParams {
    #[serde(default)]
    instructors: Option<String>,
}

/// Section instructors, given as `?instructors=pennkey1,pennkey2`
#[derive(Debug, Default)]
pub struct Instructors(pub Vec<String>);

#[async_trait]
impl<S> FromRequestParts<S> for Instructors
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<InstructorsParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        let instructors = params
            .instructors
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|username| !username.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Instructors(instructors))
    }
}
