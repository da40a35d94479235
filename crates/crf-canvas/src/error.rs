//! Canvas API errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Canvas request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Canvas returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Canvas resource not found: {0}")]
    NotFound(String),

    #[error("Invalid Canvas URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid Canvas base URL: {0}")]
    BaseUrl(String),

    #[error("Unexpected Canvas response: {0}")]
    Decode(String),
}

impl CanvasError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<CanvasError> for crf_core::CrfError {
    fn from(err: CanvasError) -> Self {
        crf_core::CrfError::lms(err.to_string())
    }
}

pub type CanvasResult<T> = Result<T, CanvasError>;
