//! Course site request contracts
//!
//! - [`RequestFormSchema`]: the fields a user sees and their choices
//! - [`RequestContract`]: validation of a submitted or edited request

mod contract;
mod form;

pub use contract::RequestContract;
pub use form::{Choice, FormField, RequestFormInitial, RequestFormSchema, SiteOption, Widget};

/// Request field names
pub mod fields {
    pub const PROXY_REQUESTER: &str = "proxy_requester";
    pub const TITLE_OVERRIDE: &str = "title_override";
    pub const COPY_FROM_COURSE: &str = "copy_from_course";
    pub const RESERVES: &str = "reserves";
    pub const LPS_ONLINE: &str = "lps_online";
    pub const EXCLUDE_ANNOUNCEMENTS: &str = "exclude_announcements";
    pub const ADDITIONAL_ENROLLMENTS: &str = "additional_enrollments";
    pub const ADDITIONAL_INSTRUCTIONS: &str = "additional_instructions";
}
