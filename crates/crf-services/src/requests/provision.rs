//! Provision service
//!
//! Creates (or updates) the Canvas course for an approved request, then
//! cleans up copied content. The request ends up `Completed`, or `Error`
//! with the failure recorded in its process notes.

use std::sync::Arc;

use crf_auth::CurrentUser;
use crf_canvas::{CanvasService, Course, CourseParams};
use crf_core::error::{CrfError, ValidationErrors};
use crf_core::result::CrfResult;
use crf_core::traits::Id;
use crf_db::RequestStore;
use crf_models::{Entity, Request, RequestStatus};
use serde::Serialize;

/// What provisioning did
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionOutcome {
    pub request: Request,
    /// A new course was created rather than an existing one updated
    pub created: bool,
    pub zoom_events_deleted: usize,
    pub announcements_deleted: usize,
}

impl ProvisionOutcome {
    pub fn is_success(&self) -> bool {
        self.request.status == RequestStatus::Completed
    }
}

pub struct ProvisionService {
    canvas: Arc<CanvasService>,
    requests: Arc<dyn RequestStore>,
}

impl ProvisionService {
    pub fn new(canvas: Arc<CanvasService>, requests: Arc<dyn RequestStore>) -> Self {
        Self { canvas, requests }
    }

    pub async fn call(&self, user: &CurrentUser, id: Id) -> CrfResult<ProvisionOutcome> {
        if !user.can_provision() {
            return Err(CrfError::forbidden("Only staff can provision requests"));
        }

        let mut request = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| CrfError::not_found(Request::TYPE_NAME, "id", id))?;

        if !matches!(request.status, RequestStatus::Approved | RequestStatus::Error) {
            let mut errors = ValidationErrors::new();
            errors.add_base(format!(
                "Only approved requests can be provisioned (status is {})",
                request.status.as_str()
            ));
            return Err(errors.into());
        }

        request.status = RequestStatus::InProcess;
        request.process_notes = None;
        let mut request = self.requests.update(id, &request).await?;

        let params = self.course_params(&request).await;
        let sync = self
            .canvas
            .update_or_create_canvas_course(&params, self.canvas.main_account_id())
            .await;

        let mut outcome = ProvisionOutcome {
            request: request.clone(),
            created: sync.created,
            zoom_events_deleted: 0,
            announcements_deleted: 0,
        };

        let course = match (sync.course, sync.error) {
            (Some(course), _) => course,
            (None, error) => {
                let notes = error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Canvas course was not created".to_string());
                tracing::error!(id, section_code = %request.section_code, %notes, "Provisioning failed");
                request.status = RequestStatus::Error;
                request.process_notes = Some(notes);
                outcome.request = self.requests.update(id, &request).await?;
                return Ok(outcome);
            }
        };

        request.canvas_course_id = Some(course.id);
        match self.clean_up(&request, &course, &mut outcome).await {
            Ok(()) => {
                request.status = RequestStatus::Completed;
                tracing::info!(
                    id,
                    course_id = course.id,
                    created = outcome.created,
                    "Request provisioned"
                );
            }
            Err(e) => {
                tracing::error!(id, course_id = course.id, error = %e, "Content cleanup failed");
                request.status = RequestStatus::Error;
                request.process_notes = Some(e.to_string());
            }
        }

        outcome.request = self.requests.update(id, &request).await?;
        Ok(outcome)
    }

    async fn course_params(&self, request: &Request) -> CourseParams {
        let term_id = match request.term() {
            Some(term) => self.canvas.get_canvas_enrollment_term_id(term.code()).await,
            None => None,
        };

        CourseParams {
            name: request.course_name().to_string(),
            sis_course_id: request.section_code.clone(),
            course_code: Some(request.section_code.clone()),
            term_id,
        }
    }

    async fn clean_up(
        &self,
        request: &Request,
        course: &Course,
        outcome: &mut ProvisionOutcome,
    ) -> Result<(), crf_canvas::CanvasError> {
        if request.copy_from_course.is_some() {
            outcome.zoom_events_deleted = self.canvas.delete_zoom_events(course).await?;
        }
        if request.exclude_announcements {
            outcome.announcements_deleted = self.canvas.delete_announcements(course).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crf_canvas::{
        CalendarEvent, CanvasError, CourseSection, DiscussionTopic, EnrollmentTerm, MockCanvasApi,
        MAIN_ACCOUNT_ID,
    };
    use crf_db::MockRequestStore;
    use crf_models::User;
    use std::sync::Mutex;

    fn staff() -> CurrentUser {
        CurrentUser::new(User {
            is_staff: true,
            ..User::new("admin1")
        })
    }

    fn approved() -> Request {
        Request {
            id: Some(1),
            status: RequestStatus::Approved,
            title_override: Some("Intro to Writing".to_string()),
            copy_from_course: Some(500),
            exclude_announcements: true,
            ..Request::new("ENGL-101-001 2023C", "prof1")
        }
    }

    fn course(id: i64, name: &str) -> Course {
        Course {
            id,
            name: name.to_string(),
            course_code: None,
            sis_course_id: Some("ENGL-101-001 2023C".to_string()),
            account_id: Some(MAIN_ACCOUNT_ID),
            enrollment_term_id: Some(4),
            workflow_state: None,
        }
    }

    /// Store that keeps the last written request
    fn store(initial: Request, saved: Arc<Mutex<Vec<Request>>>) -> MockRequestStore {
        let mut store = MockRequestStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(initial.clone())));
        store.expect_update().returning(move |_, request| {
            saved.lock().unwrap().push(request.clone());
            Ok(request.clone())
        });
        store
    }

    fn terms(canvas: &mut MockCanvasApi) {
        canvas.expect_get_enrollment_terms().returning(|_| {
            Ok(vec![EnrollmentTerm {
                id: 4,
                name: "Fall 2023 (202330)".to_string(),
                sis_term_id: None,
                start_at: None,
                end_at: None,
            }])
        });
    }

    fn service(canvas: MockCanvasApi, store: MockRequestStore) -> ProvisionService {
        ProvisionService::new(
            Arc::new(CanvasService::new(Arc::new(canvas), MAIN_ACCOUNT_ID)),
            Arc::new(store),
        )
    }

    #[tokio::test]
    async fn test_requires_staff() {
        let mut store = MockRequestStore::new();
        store.expect_find_by_id().never();
        let service = service(MockCanvasApi::new(), store);

        let user = CurrentUser::new(User::new("prof1"));
        assert_eq!(service.call(&user, 1).await.unwrap_err().status_code(), 403);
    }

    #[tokio::test]
    async fn test_submitted_request_is_rejected() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let request = Request {
            status: RequestStatus::Submitted,
            ..approved()
        };
        let service = service(MockCanvasApi::new(), store(request, saved.clone()));

        assert_eq!(service.call(&staff(), 1).await.unwrap_err().status_code(), 422);
        assert!(saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provision_creates_course_and_cleans_up() {
        let mut canvas = MockCanvasApi::new();
        terms(&mut canvas);
        canvas
            .expect_create_course()
            .withf(|account, params| {
                *account == MAIN_ACCOUNT_ID
                    && params.name == "Intro to Writing"
                    && params.sis_course_id == "ENGL-101-001 2023C"
                    && params.term_id == Some(4)
            })
            .returning(|_, p| Ok(course(77, &p.name)));
        canvas.expect_create_course_section().returning(|course_id, s, _| {
            Ok(CourseSection {
                id: 1,
                name: s.name.clone(),
                sis_section_id: Some(s.sis_section_id.clone()),
                course_id,
            })
        });
        canvas.expect_get_calendar_events().returning(|_, _| {
            Ok(vec![CalendarEvent {
                id: 3,
                title: Some("Zoom lecture".to_string()),
                description: None,
                location_name: None,
                context_code: None,
                start_at: None,
            }])
        });
        canvas
            .expect_delete_calendar_event()
            .times(1)
            .returning(|id, _| {
                Ok(CalendarEvent {
                    id,
                    title: Some("Zoom lecture".to_string()),
                    description: None,
                    location_name: None,
                    context_code: None,
                    start_at: None,
                })
            });
        canvas.expect_get_discussion_topics().returning(|_, _| {
            Ok(vec![DiscussionTopic {
                id: 9,
                title: "Welcome".to_string(),
                is_announcement: true,
            }])
        });
        canvas
            .expect_delete_discussion_topic()
            .times(1)
            .returning(|_, _| Ok(()));

        let saved = Arc::new(Mutex::new(Vec::new()));
        let outcome = service(canvas, store(approved(), saved.clone()))
            .call(&staff(), 1)
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert!(outcome.created);
        assert_eq!(outcome.zoom_events_deleted, 1);
        assert_eq!(outcome.announcements_deleted, 1);
        assert_eq!(outcome.request.canvas_course_id, Some(77));

        let saved = saved.lock().unwrap();
        assert_eq!(saved[0].status, RequestStatus::InProcess);
        assert_eq!(saved.last().map(|r| r.status), Some(RequestStatus::Completed));
    }

    #[tokio::test]
    async fn test_provision_failure_records_error() {
        let mut canvas = MockCanvasApi::new();
        terms(&mut canvas);
        canvas.expect_create_course().returning(|_, _| {
            Err(CanvasError::Status {
                status: 400,
                message: "invalid".to_string(),
            })
        });
        canvas.expect_get_course_by_sis_id().returning(|sis| {
            Err(CanvasError::NotFound(format!("/courses/sis_course_id:{}", sis)))
        });
        canvas.expect_get_calendar_events().never();

        let saved = Arc::new(Mutex::new(Vec::new()));
        let outcome = service(canvas, store(approved(), saved.clone()))
            .call(&staff(), 1)
            .await
            .unwrap();

        assert!(!outcome.is_success());
        assert_eq!(outcome.request.status, RequestStatus::Error);
        assert!(outcome.request.process_notes.is_some());
        assert_eq!(outcome.request.canvas_course_id, None);
    }
}
