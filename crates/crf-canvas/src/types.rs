//! Canvas REST resources
//!
//! Only the fields the form reads are mapped; Canvas sends many more.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub parent_account_id: Option<i64>,
    pub sis_account_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentTerm {
    pub id: i64,
    pub name: String,
    pub sis_term_id: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

/// `GET /accounts/:id/terms` wraps its list in an object
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EnrollmentTermsPage {
    pub enrollment_terms: Vec<EnrollmentTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasUser {
    pub id: i64,
    pub name: String,
    pub login_id: Option<String>,
    pub sis_user_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub course_code: Option<String>,
    pub sis_course_id: Option<String>,
    pub account_id: Option<i64>,
    pub enrollment_term_id: Option<i64>,
    pub workflow_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSection {
    pub id: i64,
    pub name: String,
    pub sis_section_id: Option<String>,
    pub course_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub context_code: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionTopic {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub is_announcement: bool,
}

/// Attributes sent when creating or updating a course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseParams {
    pub name: String,
    pub sis_course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionParams {
    pub name: String,
    pub sis_section_id: String,
}
