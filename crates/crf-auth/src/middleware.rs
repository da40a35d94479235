//! Remote-user authentication
//!
//! Resolves the user named by the SSO proxy's header. With a user store the
//! account is fetched (and created on first sign-in); without one a bare,
//! non-staff user is returned.

use std::sync::Arc;

use axum::http::HeaderMap;
use crf_db::UserStore;
use crf_models::User;
use thiserror::Error;

use crate::permissions::CurrentUser;

/// Default header set by the SSO proxy
pub const DEFAULT_REMOTE_USER_HEADER: &str = "x-remote-user";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Required,
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authenticator for validating requests
#[derive(Clone)]
pub struct Authenticator {
    header: String,
    users: Option<Arc<dyn UserStore>>,
}

impl Authenticator {
    pub fn new(header: impl Into<String>, users: Option<Arc<dyn UserStore>>) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
            users,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// The trimmed remote user, if the header is present and non-empty
    pub fn remote_user<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        headers
            .get(self.header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|username| !username.is_empty())
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<CurrentUser, AuthError> {
        let username = self.remote_user(headers).ok_or(AuthError::Required)?;

        let user = match &self.users {
            Some(users) => users.ensure(username).await.map_err(|e| {
                tracing::error!(username, error = %e, "Failed to load remote user");
                AuthError::Internal(e.to_string())
            })?,
            None => User::new(username),
        };

        tracing::debug!(username = %user.username, is_staff = user.is_staff, "Authenticated");
        Ok(CurrentUser::new(user))
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_USER_HEADER, None)
    }
}
