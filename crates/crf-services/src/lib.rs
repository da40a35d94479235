//! # crf-services
//!
//! Business logic services for the course request form.
//!
//! Services combine contracts, stores and Canvas operations into the actions
//! the API exposes: managing requests, provisioning their Canvas sites and
//! changing a user's email.

pub mod requests;
pub mod result;
pub mod users;

pub use requests::{
    ProvisionOutcome, ProvisionService, RequestFormService, RequestService, SetAttributesService,
};
pub use result::ServiceResult;
pub use users::{CanvasSitesService, ChangeEmailService};
