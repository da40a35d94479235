//! Result type aliases

use crate::error::CrfError;

/// Standard Result type for course request operations
pub type CrfResult<T> = Result<T, CrfError>;
