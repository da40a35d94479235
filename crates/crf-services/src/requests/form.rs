//! Request form service
//!
//! Resolves the section's instructors and, for a single instructor, the
//! Canvas sites they teach.

use std::sync::Arc;

use crf_canvas::CanvasService;
use crf_contracts::{RequestFormInitial, RequestFormSchema, SiteOption};
use crf_core::result::CrfResult;
use crf_db::UserStore;
use crf_models::User;

pub struct RequestFormService {
    canvas: Arc<CanvasService>,
    users: Arc<dyn UserStore>,
}

impl RequestFormService {
    pub fn new(canvas: Arc<CanvasService>, users: Arc<dyn UserStore>) -> Self {
        Self { canvas, users }
    }

    pub async fn initial(&self, instructors: &[String]) -> CrfResult<RequestFormInitial> {
        if instructors.is_empty() {
            return Ok(RequestFormInitial::default());
        }

        let known = self.users.find_many_by_username(instructors).await?;
        let instructors: Vec<User> = instructors
            .iter()
            .map(|username| {
                known
                    .iter()
                    .find(|user| &user.username == username)
                    .cloned()
                    .unwrap_or_else(|| User::new(username.as_str()))
            })
            .collect();

        let mut initial = RequestFormInitial {
            instructors: Some(instructors),
            ..Default::default()
        };

        if let [instructor] = initial.instructors.as_deref().unwrap_or_default() {
            let username = instructor.username.clone();
            let sites = self
                .canvas
                .get_user_canvas_sites(&username)
                .await?
                .unwrap_or_default();

            initial.instructor_sites = sites
                .into_iter()
                .map(|course| SiteOption {
                    id: course.id,
                    name: course.name,
                })
                .collect();
            initial.proxy_requester = Some(username);
        }

        Ok(initial)
    }

    pub async fn build(&self, instructors: &[String]) -> CrfResult<RequestFormSchema> {
        let initial = self.initial(instructors).await?;
        Ok(RequestFormSchema::build(&initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crf_canvas::{CanvasUser, Course, MockCanvasApi, MAIN_ACCOUNT_ID};
    use crf_contracts::requests::fields::{COPY_FROM_COURSE, PROXY_REQUESTER};
    use crf_db::MockUserStore;

    fn course(id: i64, name: &str) -> Course {
        Course {
            id,
            name: name.to_string(),
            course_code: None,
            sis_course_id: None,
            account_id: None,
            enrollment_term_id: None,
            workflow_state: None,
        }
    }

    fn service(canvas: MockCanvasApi, users: MockUserStore) -> RequestFormService {
        RequestFormService::new(
            Arc::new(CanvasService::new(Arc::new(canvas), MAIN_ACCOUNT_ID)),
            Arc::new(users),
        )
    }

    #[tokio::test]
    async fn test_no_instructors() {
        let mut users = MockUserStore::new();
        users.expect_find_many_by_username().never();

        let schema = service(MockCanvasApi::new(), users).build(&[]).await.unwrap();
        assert!(!schema.has_field(PROXY_REQUESTER));
        assert!(!schema.has_field(COPY_FROM_COURSE));
    }

    #[tokio::test]
    async fn test_single_instructor_gets_sites() {
        let mut users = MockUserStore::new();
        users.expect_find_many_by_username().returning(|_| {
            Ok(vec![User {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                ..User::new("prof1")
            }])
        });

        let mut canvas = MockCanvasApi::new();
        canvas.expect_get_user().returning(|id, _| {
            Ok(CanvasUser {
                id: 9,
                name: "Ada Lovelace".to_string(),
                login_id: Some(id.to_string()),
                sis_user_id: None,
                email: None,
            })
        });
        canvas
            .expect_get_user_courses()
            .returning(|_, _| Ok(vec![course(5, "Old"), course(8, "Newer")]));

        let schema = service(canvas, users)
            .build(&["prof1".to_string()])
            .await
            .unwrap();

        let proxy = schema.field(PROXY_REQUESTER).unwrap();
        assert!(proxy.disabled);
        assert_eq!(proxy.choices[0].label, "Ada Lovelace");
        let copy = schema.field(COPY_FROM_COURSE).unwrap();
        assert_eq!(copy.choices[0].label, "Newer (8)");
    }

    #[tokio::test]
    async fn test_multiple_instructors_skip_canvas() {
        let mut users = MockUserStore::new();
        users.expect_find_many_by_username().returning(|_| Ok(Vec::new()));
        let mut canvas = MockCanvasApi::new();
        canvas.expect_get_user().never();

        let schema = service(canvas, users)
            .build(&["prof1".to_string(), "prof2".to_string()])
            .await
            .unwrap();

        let proxy = schema.field(PROXY_REQUESTER).unwrap();
        assert!(!proxy.disabled);
        assert_eq!(proxy.choices.len(), 2);
        assert_eq!(proxy.choices[1].value, "prof2");
    }
}
