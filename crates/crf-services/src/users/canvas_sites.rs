//! Canvas sites taught by the signed-in user

use std::sync::Arc;

use crf_auth::CurrentUser;
use crf_canvas::CanvasService;
use crf_contracts::SiteOption;
use crf_core::error::CrfError;
use crf_core::result::CrfResult;
use crf_db::UserStore;

pub struct CanvasSitesService {
    canvas: Arc<CanvasService>,
    users: Arc<dyn UserStore>,
}

impl CanvasSitesService {
    pub fn new(canvas: Arc<CanvasService>, users: Arc<dyn UserStore>) -> Self {
        Self { canvas, users }
    }

    /// Sites newest first. Remembers the user's Canvas id on the way.
    pub async fn call(&self, user: &CurrentUser) -> CrfResult<Vec<SiteOption>> {
        let canvas_user = self
            .canvas
            .get_canvas_user_by_pennkey(user.username())
            .await
            .ok_or_else(|| CrfError::not_found("Canvas user", "sis_login_id", user.username()))?;

        if user.user.canvas_id != Some(canvas_user.id) {
            if let Err(e) = self
                .users
                .set_canvas_id(user.username(), canvas_user.id)
                .await
            {
                tracing::warn!(username = user.username(), error = %e, "Failed to store Canvas id");
            }
        }

        let mut sites: Vec<SiteOption> = self
            .canvas
            .get_teacher_courses(canvas_user.id)
            .await?
            .into_iter()
            .map(|course| SiteOption {
                id: course.id,
                name: course.name,
            })
            .collect();
        sites.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(sites)
    }
}
