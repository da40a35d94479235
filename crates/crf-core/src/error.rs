//! Core error types for the course request form
//!
//! Field-level and form-level validation errors plus the domain error enum
//! every layer converts into.

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all course request operations
#[derive(Error, Debug)]
pub enum CrfError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },
}

impl CrfError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        CrfError::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CrfError::Forbidden {
            message: message.into(),
        }
    }

    pub fn lms(message: impl Into<String>) -> Self {
        CrfError::ExternalService {
            service: "canvas".to_string(),
            message: message.into(),
        }
    }

    /// HTTP status code mapping
    pub fn status_code(&self) -> u16 {
        match self {
            CrfError::NotFound { .. } => 404,
            CrfError::Unauthorized { .. } => 401,
            CrfError::Forbidden { .. } => 403,
            CrfError::Validation(_) => 422,
            CrfError::Database(_) | CrfError::Internal(_) | CrfError::Config(_) => 500,
            CrfError::ExternalService { .. } => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CrfError::NotFound { .. } => "not_found",
            CrfError::Unauthorized { .. } => "unauthorized",
            CrfError::Forbidden { .. } => "forbidden",
            CrfError::Validation(_) => "validation_failed",
            CrfError::Database(_) => "database_error",
            CrfError::Internal(_) => "internal_error",
            CrfError::Config(_) => "configuration_error",
            CrfError::ExternalService { .. } => "external_service_error",
        }
    }
}

/// Validation errors collection (field errors plus form-wide errors)
#[derive(Error, Debug, Default, Clone, PartialEq)]
#[error("Validation errors: {}", self.full_messages().join(", "))]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
