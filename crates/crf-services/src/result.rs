//! Service result type
//!
//! Outcome of the synchronous attribute-setting step: either the updated
//! entity or the validation errors that stopped it.

use crf_core::error::{CrfError, ValidationErrors};

/// Represents the result of a service call
#[derive(Debug, Clone)]
pub struct ServiceResult<T> {
    result: Option<T>,
    errors: ValidationErrors,
}

impl<T> ServiceResult<T> {
    pub fn success(result: T) -> Self {
        Self {
            result: Some(result),
            errors: ValidationErrors::new(),
        }
    }

    pub fn failure(errors: ValidationErrors) -> Self {
        Self {
            result: None,
            errors,
        }
    }

    /// Create a failed service result with a single field error
    pub fn failure_with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::failure(errors)
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn into_result(self) -> Result<T, ValidationErrors> {
        self.result.ok_or(self.errors)
    }
}

impl<T> From<Result<T, ValidationErrors>> for ServiceResult<T> {
    fn from(result: Result<T, ValidationErrors>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(errors) => ServiceResult::failure(errors),
        }
    }
}

impl<T> From<ServiceResult<T>> for Result<T, CrfError> {
    fn from(result: ServiceResult<T>) -> Self {
        result.into_result().map_err(CrfError::Validation)
    }
}
