//! Canvas lookups

use axum::{extract::State, Json};
use crf_canvas::Account;
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Serialize)]
pub struct TermInfo {
    pub code: i32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Terms {
    pub current: TermInfo,
    pub next: TermInfo,
}

/// GET /api/terms
pub async fn terms(State(state): State<AppState>, _user: AuthenticatedUser) -> Json<Terms> {
    let canvas = &state.canvas;
    Json(Terms {
        current: TermInfo {
            code: canvas.current_term_code(),
            name: canvas.current_term().await,
        },
        next: TermInfo {
            code: canvas.next_term_code(),
            name: canvas.next_term().await,
        },
    })
}

/// GET /api/canvas/accounts
pub async fn accounts(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(state.canvas.get_all_canvas_accounts().await?))
}
