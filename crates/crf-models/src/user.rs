//! User model
//!
//! Table: users

use chrono::{DateTime, Utc};
use crf_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};

/// User entity
///
/// Accounts are created on first sign-in through the SSO proxy; the username
/// is the PennKey, which doubles as the Canvas SIS login id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: Option<Id>,

    /// Login name (unique)
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Staff can see and provision every request
    pub is_staff: bool,

    /// Canvas user id, filled in lazily
    pub canvas_id: Option<i64>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    /// Full name, falling back to the username
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        if name.is_empty() {
            self.username.clone()
        } else {
            name
        }
    }
}
