//! Change email service

use std::sync::Arc;

use crf_auth::CurrentUser;
use crf_contracts::{EmailContract, EmailForm};
use crf_core::result::CrfResult;
use crf_db::UserStore;
use crf_models::User;

pub struct ChangeEmailService {
    users: Arc<dyn UserStore>,
}

impl ChangeEmailService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn call(&self, user: &CurrentUser, form: &EmailForm) -> CrfResult<User> {
        let cleaned = EmailContract::new(user.username()).clean(form)?;
        let updated = self
            .users
            .update_email(&cleaned.username, &cleaned.email)
            .await?;

        tracing::info!(username = %updated.username, "Email changed");
        Ok(updated)
    }
}
