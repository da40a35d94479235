//! # crf-models
//!
//! Domain models for the course request form.
//!
//! Each model implements `Entity` and `Identifiable` from `crf-core`.

pub use crf_core::traits::{Entity, Id, Identifiable};

pub mod request;
pub mod term;
pub mod user;

pub use request::{
    AdditionalEnrollment, CreateRequestDto, EnrollmentRole, Request, RequestStatus,
    UpdateRequestDto,
};
pub use term::{Season, Term};
pub use user::User;
