//! Course provisioning and cleanup on Canvas
//!
//! Every operation is a direct call (or one paginated listing) against the
//! API. Lookups that only feed the form degrade to `None`/fallback values
//! and log; course creation reports its outcome in a [`CourseSync`].

use std::sync::Arc;

use chrono::Utc;
use crf_models::Term;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::client::CanvasApi;
use crate::error::{CanvasError, CanvasResult};
use crate::types::*;

/// Root account of the institution's Canvas instance
pub const MAIN_ACCOUNT_ID: i64 = 96678;

const SIS_LOGIN_ID: &str = "sis_login_id";
const TEACHER: &str = "teacher";
const ZOOM_KEYWORD: &str = "zoom";
const CANCEL_REASON: &str = "Content migration";

/// Outcome of [`CanvasService::update_or_create_canvas_course`]
#[derive(Debug)]
pub struct CourseSync {
    /// `true` only when a new course was created
    pub created: bool,
    pub course: Option<Course>,
    pub error: Option<CanvasError>,
}

impl CourseSync {
    pub fn is_success(&self) -> bool {
        self.course.is_some()
    }
}

/// Case-insensitive check for the Zoom keyword
pub fn contains_zoom(value: Option<&str>) -> bool {
    value.is_some_and(|value| value.to_lowercase().contains(ZOOM_KEYWORD))
}

/// Whether a calendar event's location, description or title mentions Zoom
pub fn is_zoom_event(event: &CalendarEvent) -> bool {
    contains_zoom(event.location_name.as_deref())
        || contains_zoom(event.description.as_deref())
        || contains_zoom(event.title.as_deref())
}

/// Canvas operations used by the request form
pub struct CanvasService {
    api: Arc<dyn CanvasApi>,
    main_account_id: i64,
    current_term: i32,
    next_term: i32,
    accounts: OnceCell<Vec<Account>>,
}

impl CanvasService {
    /// Current and next term default to the terms in session today
    pub fn new(api: Arc<dyn CanvasApi>, main_account_id: i64) -> Self {
        let today = Term::for_date(Utc::now().date_naive());
        Self {
            api,
            main_account_id,
            current_term: today.code(),
            next_term: today.next().code(),
            accounts: OnceCell::new(),
        }
    }

    /// Override the current and/or next term codes
    pub fn with_terms(mut self, current: Option<i32>, next: Option<i32>) -> Self {
        if let Some(current) = current {
            self.current_term = current;
        }
        if let Some(next) = next {
            self.next_term = next;
        }
        self
    }

    pub fn current_term_code(&self) -> i32 {
        self.current_term
    }

    pub fn next_term_code(&self) -> i32 {
        self.next_term
    }

    pub fn api(&self) -> &dyn CanvasApi {
        self.api.as_ref()
    }

    pub fn main_account_id(&self) -> i64 {
        self.main_account_id
    }

    pub async fn get_canvas_account(&self, account_id: i64) -> CanvasResult<Account> {
        self.api.get_account(account_id).await
    }

    pub async fn get_canvas_main_account(&self) -> CanvasResult<Account> {
        self.get_canvas_account(self.main_account_id).await
    }

    /// All sub-accounts of the main account, fetched once per process
    pub async fn get_all_canvas_accounts(&self) -> CanvasResult<Vec<Account>> {
        let accounts = self
            .accounts
            .get_or_try_init(|| self.api.get_subaccounts(self.main_account_id, true))
            .await?;
        Ok(accounts.clone())
    }

    pub async fn get_canvas_user_by_pennkey(&self, pennkey: &str) -> Option<CanvasUser> {
        match self.api.get_user(pennkey, SIS_LOGIN_ID).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(pennkey, error = %e, "Canvas user lookup failed");
                None
            }
        }
    }

    pub async fn get_canvas_user_id_by_pennkey(&self, pennkey: &str) -> Option<i64> {
        self.get_canvas_user_by_pennkey(pennkey)
            .await
            .map(|user| user.id)
    }

    /// Id of the first enrollment term whose name contains the term code
    pub async fn get_canvas_enrollment_term_id(&self, term: i32) -> Option<i64> {
        let term_name = term.to_string();
        let terms = match self.api.get_enrollment_terms(self.main_account_id).await {
            Ok(terms) => terms,
            Err(e) => {
                warn!(term, error = %e, "Failed to list enrollment terms");
                return None;
            }
        };

        terms
            .into_iter()
            .find(|enrollment_term| enrollment_term.name.contains(&term_name))
            .map(|enrollment_term| enrollment_term.id)
    }

    /// Name of an enrollment term, or an empty string if it can't be fetched
    pub async fn get_canvas_enrollment_term_name(&self, enrollment_term_id: i64) -> String {
        match self
            .api
            .get_enrollment_term(self.main_account_id, enrollment_term_id)
            .await
        {
            Ok(term) => term.name,
            Err(e) => {
                warn!(enrollment_term_id, error = %e, "Failed to fetch enrollment term");
                String::new()
            }
        }
    }

    /// Human-readable name for a term code, falling back to the code itself
    pub async fn resolve_term_name(&self, term: i32) -> String {
        if let Some(term_id) = self.get_canvas_enrollment_term_id(term).await {
            let name = self.get_canvas_enrollment_term_name(term_id).await;
            if !name.is_empty() {
                return name;
            }
        }
        term.to_string()
    }

    pub async fn current_term(&self) -> String {
        self.resolve_term_name(self.current_term).await
    }

    pub async fn next_term(&self) -> String {
        self.resolve_term_name(self.next_term).await
    }

    pub async fn create_course_section(
        &self,
        name: &str,
        sis_course_id: &str,
        canvas_course: &Course,
    ) -> CanvasResult<CourseSection> {
        let section = SectionParams {
            name: name.to_string(),
            sis_section_id: sis_course_id.to_string(),
        };
        self.api
            .create_course_section(canvas_course.id, &section, true)
            .await
    }

    /// Update the course with the same SIS id
    pub async fn update_canvas_course(&self, course: &CourseParams) -> CanvasResult<Course> {
        let sis_course_id = &course.sis_course_id;
        let result = async {
            let canvas_course = self.api.get_course_by_sis_id(sis_course_id).await?;
            self.api.update_course(canvas_course.id, course).await
        }
        .await;

        if let Err(ref e) = result {
            error!("FAILED to update Canvas course '{}': {}", sis_course_id, e);
        }
        result
    }

    /// Create the course and its section; fall back to updating on failure
    pub async fn update_or_create_canvas_course(
        &self,
        course: &CourseParams,
        account_id: i64,
    ) -> CourseSync {
        let created = async {
            let canvas_course = self.api.create_course(account_id, course).await?;
            let sis_course_id = canvas_course
                .sis_course_id
                .clone()
                .unwrap_or_else(|| course.sis_course_id.clone());
            self.create_course_section(&canvas_course.name, &sis_course_id, &canvas_course)
                .await?;
            Ok::<_, CanvasError>(canvas_course)
        }
        .await;

        match created {
            Ok(canvas_course) => {
                info!(
                    course_id = canvas_course.id,
                    sis_course_id = %course.sis_course_id,
                    "Created Canvas course"
                );
                CourseSync {
                    created: true,
                    course: Some(canvas_course),
                    error: None,
                }
            }
            Err(e) => {
                info!(
                    sis_course_id = %course.sis_course_id,
                    error = %e,
                    "Course creation failed, updating existing course"
                );
                match self.update_canvas_course(course).await {
                    Ok(canvas_course) => CourseSync {
                        created: false,
                        course: Some(canvas_course),
                        error: None,
                    },
                    Err(e) => CourseSync {
                        created: false,
                        course: None,
                        error: Some(e),
                    },
                }
            }
        }
    }

    pub async fn get_calendar_events(&self, course_id: i64) -> CanvasResult<Vec<CalendarEvent>> {
        let context_codes = vec![format!("course_{}", course_id)];
        self.api.get_calendar_events(&context_codes, true).await
    }

    pub async fn delete_zoom_event(&self, event_id: i64) -> CanvasResult<()> {
        let deleted = self.api.delete_calendar_event(event_id, CANCEL_REASON).await?;
        let title: String = deleted
            .title
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii)
            .collect();
        info!("DELETED event '{}'", title);
        Ok(())
    }

    /// Delete every Zoom calendar event of a course; returns how many
    pub async fn delete_zoom_events(&self, canvas_course: &Course) -> CanvasResult<usize> {
        info!("Deleting Zoom events...");
        let events = self.get_calendar_events(canvas_course.id).await?;
        let zoom_events: Vec<i64> = events
            .iter()
            .filter(|event| is_zoom_event(event))
            .map(|event| event.id)
            .collect();

        for event_id in &zoom_events {
            self.delete_zoom_event(*event_id).await?;
        }
        Ok(zoom_events.len())
    }

    pub async fn delete_announcement(
        &self,
        canvas_course: &Course,
        announcement: &DiscussionTopic,
    ) -> CanvasResult<()> {
        self.api
            .delete_discussion_topic(canvas_course.id, announcement.id)
            .await?;
        info!("DELETED announcement '{}'", announcement.title);
        Ok(())
    }

    /// Delete every announcement of a course; returns how many
    pub async fn delete_announcements(&self, canvas_course: &Course) -> CanvasResult<usize> {
        info!("Deleting Announcements...");
        let announcements = self
            .api
            .get_discussion_topics(canvas_course.id, true)
            .await?;
        for announcement in &announcements {
            self.delete_announcement(canvas_course, announcement).await?;
        }
        Ok(announcements.len())
    }

    /// Courses the user teaches, or `None` if the user isn't in Canvas
    pub async fn get_user_canvas_sites(&self, username: &str) -> CanvasResult<Option<Vec<Course>>> {
        let Some(user) = self.get_canvas_user_by_pennkey(username).await else {
            return Ok(None);
        };
        Ok(Some(self.get_teacher_courses(user.id).await?))
    }

    /// Courses the Canvas user is enrolled in as a teacher
    pub async fn get_teacher_courses(&self, canvas_user_id: i64) -> CanvasResult<Vec<Course>> {
        self.api.get_user_courses(canvas_user_id, TEACHER).await
    }
}
