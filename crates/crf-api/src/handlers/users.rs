//! Current user handlers

use axum::{extract::State, Json};
use crf_contracts::{EmailForm, SiteOption};
use crf_models::User;
use crf_services::{CanvasSitesService, ChangeEmailService};
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// POST /api/users/me/email
pub async fn change_email(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(form): Json<EmailForm>,
) -> ApiResult<Json<User>> {
    let updated = ChangeEmailService::new(state.users.clone())
        .call(&user, &form)
        .await?;
    Ok(Json(updated))
}

#[derive(Debug, Serialize)]
pub struct CanvasSite {
    pub id: i64,
    pub name: String,
    pub label: String,
}

impl From<SiteOption> for CanvasSite {
    fn from(site: SiteOption) -> Self {
        Self {
            label: site.label(),
            id: site.id,
            name: site.name,
        }
    }
}

/// GET /api/users/me/canvas_sites
///
/// Newest sites first. 404 when the user has no Canvas account.
pub async fn canvas_sites(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<CanvasSite>>> {
    let sites = CanvasSitesService::new(state.canvas.clone(), state.users.clone())
        .call(&user)
        .await?;
    Ok(Json(sites.into_iter().map(CanvasSite::from).collect()))
}
