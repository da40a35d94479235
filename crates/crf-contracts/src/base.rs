//! Base contract system

use crf_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// The user a contract validates on behalf of
pub trait UserContext: Send + Sync {
    fn username(&self) -> &str;
    fn is_staff(&self) -> bool;
}

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;

    /// Check if an attribute is writable
    fn is_writable(&self, _attribute: &str) -> bool {
        true
    }
}

impl UserContext for crf_models::User {
    fn username(&self) -> &str {
        &self.username
    }

    fn is_staff(&self) -> bool {
        self.is_staff
    }
}

/// Shared "too long" check
pub(crate) fn validate_max_length(
    field: &str,
    value: Option<&str>,
    max: usize,
    errors: &mut ValidationErrors,
) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.add(field, format!("is too long (maximum is {} characters)", max));
    }
}
