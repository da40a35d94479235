//! Course site request model
//!
//! Table: requests

use chrono::{DateTime, Utc};
use crf_core::traits::{Entity, Id, Identifiable};

use crate::term::Term;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Submitted,
    Approved,
    InProcess,
    Completed,
    Error,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::InProcess => "in_process",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Requesters may edit or withdraw until provisioning starts
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Submitted | Self::Approved | Self::Error)
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "in_process" => Ok(Self::InProcess),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown request status '{}'", other)),
        }
    }
}

/// Canvas enrollment role for an additional enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentRole {
    #[serde(rename = "TeacherEnrollment")]
    Teacher,
    #[serde(rename = "TaEnrollment")]
    Ta,
    #[serde(rename = "DesignerEnrollment")]
    Designer,
    #[serde(rename = "Librarian")]
    Librarian,
    #[serde(rename = "ObserverEnrollment")]
    Observer,
}

/// Extra person to enroll in the new site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalEnrollment {
    /// Username (PennKey)
    pub user: String,
    pub role: EnrollmentRole,
}

/// Course site request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Option<Id>,

    /// SIS section the site is requested for
    pub section_code: String,

    /// Username of the submitter
    pub requester: String,

    /// Instructor the request is made on behalf of
    pub proxy_requester: Option<String>,

    pub title_override: Option<String>,

    /// Canvas id of the site to copy content from
    pub copy_from_course: Option<i64>,

    /// Library reserves
    pub reserves: bool,

    /// Online program (LPS) course
    pub lps_online: bool,

    /// Drop announcements carried over by the content copy
    pub exclude_announcements: bool,

    pub additional_enrollments: Vec<AdditionalEnrollment>,

    pub additional_instructions: Option<String>,

    pub status: RequestStatus,

    /// Last provisioning error
    pub process_notes: Option<String>,

    /// Canvas course id once provisioned
    pub canvas_course_id: Option<i64>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            id: None,
            section_code: String::new(),
            requester: String::new(),
            proxy_requester: None,
            title_override: None,
            copy_from_course: None,
            reserves: false,
            lps_online: false,
            exclude_announcements: false,
            additional_enrollments: Vec::new(),
            additional_instructions: None,
            status: RequestStatus::Submitted,
            process_notes: None,
            canvas_course_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for Request {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Request {
    const TYPE_NAME: &'static str = "Request";
}

impl Request {
    pub fn new(section_code: impl Into<String>, requester: impl Into<String>) -> Self {
        Self {
            section_code: section_code.into(),
            requester: requester.into(),
            ..Default::default()
        }
    }

    /// Name the Canvas course gets: the override, or the section code
    pub fn course_name(&self) -> &str {
        match self.title_override.as_deref() {
            Some(title) if !title.trim().is_empty() => title.trim(),
            _ => &self.section_code,
        }
    }

    /// Term from the section code's trailing SIS term, e.g. `2023C`
    pub fn term(&self) -> Option<Term> {
        self.section_code
            .split_whitespace()
            .last()
            .and_then(Term::from_short)
    }

    /// Whether `username` submitted this request or it was made on their behalf
    pub fn involves(&self, username: &str) -> bool {
        self.requester == username || self.proxy_requester.as_deref() == Some(username)
    }
}

/// DTO for submitting a request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateRequestDto {
    #[validate(length(min = 1, max = 100))]
    pub section_code: String,
    pub proxy_requester: Option<String>,
    #[validate(length(max = 255))]
    pub title_override: Option<String>,
    pub copy_from_course: Option<i64>,
    #[serde(default)]
    pub reserves: bool,
    #[serde(default)]
    pub lps_online: bool,
    #[serde(default)]
    pub exclude_announcements: bool,
    #[serde(default)]
    pub additional_enrollments: Vec<AdditionalEnrollment>,
    pub additional_instructions: Option<String>,
}

impl CreateRequestDto {
    pub fn into_request(self, requester: impl Into<String>) -> Request {
        Request {
            section_code: self.section_code,
            requester: requester.into(),
            proxy_requester: self.proxy_requester,
            title_override: self.title_override,
            copy_from_course: self.copy_from_course,
            reserves: self.reserves,
            lps_online: self.lps_online,
            exclude_announcements: self.exclude_announcements,
            additional_enrollments: self.additional_enrollments,
            additional_instructions: self.additional_instructions,
            ..Default::default()
        }
    }
}

/// A present field, `null` included, is `Some`; an absent one stays `None`
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// DTO for editing a request
///
/// Nullable columns take `Some(None)` (JSON `null`) to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequestDto {
    #[serde(default, deserialize_with = "present")]
    pub proxy_requester: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub title_override: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub copy_from_course: Option<Option<i64>>,
    pub reserves: Option<bool>,
    pub lps_online: Option<bool>,
    pub exclude_announcements: Option<bool>,
    pub additional_enrollments: Option<Vec<AdditionalEnrollment>>,
    #[serde(default, deserialize_with = "present")]
    pub additional_instructions: Option<Option<String>>,
    /// Staff only
    pub status: Option<RequestStatus>,
}

impl UpdateRequestDto {
    /// Apply updates to a request
    pub fn apply_to(&self, request: &mut Request) {
        if let Some(ref proxy) = self.proxy_requester {
            request.proxy_requester = proxy.clone();
        }
        if let Some(ref title) = self.title_override {
            request.title_override = title.clone();
        }
        if let Some(course) = self.copy_from_course {
            request.copy_from_course = course;
        }
        if let Some(reserves) = self.reserves {
            request.reserves = reserves;
        }
        if let Some(lps_online) = self.lps_online {
            request.lps_online = lps_online;
        }
        if let Some(exclude) = self.exclude_announcements {
            request.exclude_announcements = exclude;
        }
        if let Some(ref enrollments) = self.additional_enrollments {
            request.additional_enrollments = enrollments.clone();
        }
        if let Some(ref instructions) = self.additional_instructions {
            request.additional_instructions = instructions.clone();
        }
        if let Some(status) = self.status {
            request.status = status;
        }
    }
}
