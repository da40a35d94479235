//! # crf-contracts
//!
//! Form contracts for the course request form.
//!
//! Contracts validate submitted data before services persist it or call
//! Canvas. They also describe which request-form fields a user sees.

pub mod base;
pub mod email;
pub mod requests;

pub use base::*;
pub use email::{CleanedEmail, EmailContract, EmailForm, EMAILS_DONT_MATCH};
pub use requests::{
    Choice, FormField, RequestContract, RequestFormInitial, RequestFormSchema, SiteOption, Widget,
};
