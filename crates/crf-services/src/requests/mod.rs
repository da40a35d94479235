//! Request services
//!
//! - [`RequestService`]: list, find, create, update and delete
//! - [`SetAttributesService`]: apply and validate changes before persisting
//! - [`RequestFormService`]: the form schema for a section's instructors
//! - [`ProvisionService`]: create the Canvas site for an approved request

mod form;
mod provision;
mod service;
mod set_attributes;

pub use form::RequestFormService;
pub use provision::{ProvisionOutcome, ProvisionService};
pub use service::RequestService;
pub use set_attributes::SetAttributesService;
