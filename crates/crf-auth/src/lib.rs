//! # crf-auth
//!
//! Authentication and authorization for the course request form.
//!
//! The application runs behind an SSO proxy that sets a trusted remote-user
//! header. [`Authenticator`] turns that header into a [`CurrentUser`], and
//! [`CurrentUser`] answers who may see, edit and provision requests.

pub mod middleware;
pub mod permissions;

pub use middleware::{AuthError, Authenticator};
pub use permissions::CurrentUser;
