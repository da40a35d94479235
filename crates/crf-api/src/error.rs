//! API error handling
//!
//! Every error renders as a JSON body with an identifier and a message;
//! validation failures also carry their field and base errors.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crf_auth::AuthError;
use crf_canvas::CanvasError;
use crf_core::error::{CrfError, ValidationErrors};
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound { resource: &'static str, id: String },
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn identifier(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "not_found",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Unauthorized(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::BadGateway(_) => "canvas_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_errors: Option<&'a [String]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let identifier = self.identifier();

        let body = match &self {
            ApiError::NotFound { resource, id } => ErrorBody {
                error: identifier,
                message: format!("{} {} not found", resource, id),
                errors: None,
                base_errors: None,
            },
            ApiError::Validation(errors) => ErrorBody {
                error: identifier,
                message: errors.full_messages().join(", "),
                errors: Some(&errors.errors),
                base_errors: Some(&errors.base_errors),
            },
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => ErrorBody {
                error: identifier,
                message: msg.clone(),
                errors: None,
                base_errors: None,
            },
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), message = %body.message, "Request failed");
        }

        (status, Json(body)).into_response()
    }
}

impl From<CrfError> for ApiError {
    fn from(err: CrfError) -> Self {
        match err {
            CrfError::NotFound { entity, value, .. } => ApiError::not_found(entity, value),
            CrfError::Validation(errors) => ApiError::Validation(errors),
            CrfError::Unauthorized { message } => ApiError::Unauthorized(message),
            CrfError::Forbidden { message } => ApiError::Forbidden(message),
            CrfError::ExternalService { message, .. } => ApiError::BadGateway(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CanvasError> for ApiError {
    fn from(err: CanvasError) -> Self {
        CrfError::from(err).into()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Required => ApiError::unauthorized("Authentication required"),
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crf_error_mapping() {
        let err: ApiError = CrfError::not_found("Request", "id", 3).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = CrfError::lms("timeout").into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: ApiError = CrfError::Database("gone".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: ApiError = AuthError::Required.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
