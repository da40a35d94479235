//! # crf-canvas
//!
//! Canvas LMS integration for the course request form.
//!
//! - [`CanvasApi`]: one method per Canvas REST endpoint the form uses
//! - [`CanvasClient`]: the `reqwest` implementation of that trait
//! - [`CanvasService`]: course creation, term lookup and content cleanup
//!   built on top of any `CanvasApi`

pub mod client;
pub mod error;
pub mod operations;
pub mod types;

pub use client::{CanvasApi, CanvasClient};
#[cfg(any(test, feature = "mock"))]
pub use client::MockCanvasApi;
pub use error::{CanvasError, CanvasResult};
pub use operations::{contains_zoom, is_zoom_event, CanvasService, CourseSync, MAIN_ACCOUNT_ID};
pub use types::*;
