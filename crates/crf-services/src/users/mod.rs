//! User services

mod canvas_sites;
mod email;

pub use canvas_sites::CanvasSitesService;
pub use email::ChangeEmailService;
