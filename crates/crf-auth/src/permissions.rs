//! Request permissions
//!
//! Staff see and manage every request. Everyone else sees the requests they
//! submitted or that were submitted on their behalf, and can only change
//! them until provisioning starts.

use crf_contracts::UserContext;
use crf_models::{Request, User};

/// The signed-in user
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

impl CurrentUser {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn is_staff(&self) -> bool {
        self.user.is_staff
    }

    pub fn can_view(&self, request: &Request) -> bool {
        self.is_staff() || request.involves(self.username())
    }

    pub fn can_edit(&self, request: &Request) -> bool {
        self.is_staff() || (request.involves(self.username()) && request.status.is_editable())
    }

    pub fn can_delete(&self, request: &Request) -> bool {
        self.can_edit(request)
    }

    /// Creating the Canvas site is a staff action
    pub fn can_provision(&self) -> bool {
        self.is_staff()
    }
}

impl UserContext for CurrentUser {
    fn username(&self) -> &str {
        &self.user.username
    }

    fn is_staff(&self) -> bool {
        self.user.is_staff
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self::new(user)
    }
}
