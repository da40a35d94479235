//! Request CRUD service

use std::sync::Arc;

use crf_auth::CurrentUser;
use crf_contracts::RequestFormSchema;
use crf_core::error::{CrfError, ValidationErrors};
use crf_core::result::CrfResult;
use crf_core::traits::Id;
use crf_db::{Pagination, RequestStore};
use crf_models::{CreateRequestDto, Entity, Request, UpdateRequestDto};

use super::set_attributes::SetAttributesService;

pub struct RequestService {
    requests: Arc<dyn RequestStore>,
}

impl RequestService {
    pub fn new(requests: Arc<dyn RequestStore>) -> Self {
        Self { requests }
    }

    /// One page of the requests the user may see (all of them for staff),
    /// with the total across pages
    pub async fn list(
        &self,
        user: &CurrentUser,
        pagination: Pagination,
    ) -> CrfResult<(Vec<Request>, i64)> {
        let page = if user.is_staff() {
            (
                self.requests.find_all(pagination).await?,
                self.requests.count_all().await?,
            )
        } else {
            (
                self.requests
                    .find_for_user(user.username(), pagination)
                    .await?,
                self.requests.count_for_user(user.username()).await?,
            )
        };
        Ok(page)
    }

    pub async fn find(&self, user: &CurrentUser, id: Id) -> CrfResult<Request> {
        let request = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| CrfError::not_found(Request::TYPE_NAME, "id", id))?;

        // Hide other users' requests entirely
        if !user.can_view(&request) {
            return Err(CrfError::not_found(Request::TYPE_NAME, "id", id));
        }
        Ok(request)
    }

    pub async fn create(
        &self,
        user: &CurrentUser,
        params: CreateRequestDto,
        form: &RequestFormSchema,
    ) -> CrfResult<Request> {
        let request: Request = SetAttributesService::new(user)
            .with_form(form)
            .call_create(params)
            .into_result()?;

        if self
            .requests
            .find_by_section_code(&request.section_code)
            .await?
            .is_some()
        {
            let mut errors = ValidationErrors::new();
            errors.add("section_code", "already has a request");
            return Err(errors.into());
        }

        let request = self.requests.create(&request).await?;
        tracing::info!(
            id = ?request.id,
            section_code = %request.section_code,
            requester = %request.requester,
            "Request submitted"
        );
        Ok(request)
    }

    /// Edit a request; new proxy and copy-from values must be offered by `form`
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: Id,
        params: UpdateRequestDto,
        form: &RequestFormSchema,
    ) -> CrfResult<Request> {
        let request = self.find(user, id).await?;
        if !user.can_edit(&request) {
            return Err(CrfError::forbidden("This request can no longer be edited"));
        }

        let request = SetAttributesService::new(user)
            .with_form(form)
            .call_update(request, &params)
            .into_result()?;

        Ok(self.requests.update(id, &request).await?)
    }

    pub async fn delete(&self, user: &CurrentUser, id: Id) -> CrfResult<()> {
        let request = self.find(user, id).await?;
        if !user.can_delete(&request) {
            return Err(CrfError::forbidden("This request can no longer be deleted"));
        }

        self.requests.delete(id).await?;
        tracing::info!(id, section_code = %request.section_code, "Request deleted");
        Ok(())
    }
}
