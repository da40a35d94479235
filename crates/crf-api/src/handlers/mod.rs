//! API handlers

pub mod canvas;
pub mod requests;
pub mod users;
