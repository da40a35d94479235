//! Course request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crf_contracts::RequestFormSchema;
use crf_core::traits::Id;
use crf_models::{CreateRequestDto, Request, UpdateRequestDto};
use crf_services::{ProvisionService, RequestFormService, RequestService};
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, Instructors, Pagination};

#[derive(Serialize)]
pub struct RequestCollection {
    pub total: usize,
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
    pub elements: Vec<Request>,
}

fn requests(state: &AppState) -> RequestService {
    RequestService::new(state.requests.clone())
}

fn form(state: &AppState) -> RequestFormService {
    RequestFormService::new(state.canvas.clone(), state.users.clone())
}

/// GET /api/requests
pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Pagination(pagination): Pagination,
) -> ApiResult<Json<RequestCollection>> {
    let (elements, total) = requests(&state).list(&user, pagination).await?;
    Ok(Json(RequestCollection {
        total: total as usize,
        count: elements.len(),
        limit: pagination.limit,
        offset: pagination.offset,
        elements,
    }))
}

/// GET /api/requests/form?instructors=...
pub async fn request_form(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Instructors(instructors): Instructors,
) -> ApiResult<Json<RequestFormSchema>> {
    Ok(Json(form(&state).build(&instructors).await?))
}

/// POST /api/requests?instructors=...
///
/// The instructors decide which proxy and copy-from choices are accepted.
/// Only staff and the section's own instructors may pick them.
pub async fn create_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Instructors(instructors): Instructors,
    Json(params): Json<CreateRequestDto>,
) -> ApiResult<impl IntoResponse> {
    let schema = form(&state).build(&instructors).await?;
    let request = requests(&state).create(&user, params, &schema).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Request>> {
    Ok(Json(requests(&state).find(&user, id).await?))
}

/// PATCH /api/requests/:id?instructors=...
///
/// New proxy and copy-from values are checked like on creation.
pub async fn update_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Instructors(instructors): Instructors,
    Json(params): Json<UpdateRequestDto>,
) -> ApiResult<Json<Request>> {
    let schema = form(&state).build(&instructors).await?;
    Ok(Json(requests(&state).update(&user, id, params, &schema).await?))
}

/// DELETE /api/requests/:id
pub async fn delete_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    requests(&state).delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/requests/:id/provision
///
/// Responds 502 with the outcome when Canvas rejected the course.
pub async fn provision_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let outcome = ProvisionService::new(state.canvas.clone(), state.requests.clone())
        .call(&user, id)
        .await?;

    let status = if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(outcome)))
}
