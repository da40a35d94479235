//! Set attributes service for requests
//!
//! Applies submitted changes to a request and validates the result through
//! [`RequestContract`]. Nothing is persisted here.

use crf_contracts::{Contract, RequestContract, RequestFormSchema, UserContext};
use crf_core::error::ValidationErrors;
use crf_models::{CreateRequestDto, Request, UpdateRequestDto};
use validator::Validate;

use crate::result::ServiceResult;

pub struct SetAttributesService<'a, U: UserContext> {
    user: &'a U,
    form: Option<&'a RequestFormSchema>,
}

impl<'a, U: UserContext> SetAttributesService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user, form: None }
    }

    pub fn with_form(mut self, form: &'a RequestFormSchema) -> Self {
        self.form = Some(form);
        self
    }

    fn contract(&self) -> RequestContract<'a, U> {
        let contract = RequestContract::new(self.user);
        match self.form {
            Some(form) => contract.with_form(form),
            None => contract,
        }
    }

    /// Build a new request submitted by the current user
    pub fn call_create(&self, params: CreateRequestDto) -> ServiceResult<Request> {
        if let Err(errors) = params.validate() {
            return ServiceResult::failure(from_validator(&errors));
        }

        let request = params.into_request(self.user.username());
        self.contract().validate(&request).map(|_| request).into()
    }

    /// Apply `params` to an existing request
    pub fn call_update(&self, mut request: Request, params: &UpdateRequestDto) -> ServiceResult<Request> {
        let contract = self.contract().for_update(&request);

        if params.status.is_some() && !contract.is_writable("status") {
            return ServiceResult::failure_with_error("status", "can only be changed by staff");
        }

        params.apply_to(&mut request);
        contract.validate(&request).map(|_| request).into()
    }
}

/// Convert `validator` derive errors into field errors
fn from_validator(errors: &validator::ValidationErrors) -> ValidationErrors {
    let mut result = ValidationErrors::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match error.code.as_ref() {
                "length" => "has an invalid length".to_string(),
                code => format!("is invalid ({})", code),
            };
            result.add(field, message);
        }
    }
    result
}
