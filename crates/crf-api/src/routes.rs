//! API routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{canvas, requests, users};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/requests", requests_router())
        .nest("/users", users_router())
        .route("/terms", get(canvas::terms))
        .route("/canvas/accounts", get(canvas::accounts))
}

fn requests_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/form", get(requests::request_form))
        .route(
            "/:id",
            get(requests::get_request)
                .patch(requests::update_request)
                .delete(requests::delete_request),
        )
        .route("/:id/provision", post(requests::provision_request))
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/me/email", post(users::change_email))
        .route("/me/canvas_sites", get(users::canvas_sites))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use crf_canvas::{
        CanvasError, CanvasService, CanvasUser, Course, EnrollmentTerm, MockCanvasApi,
        MAIN_ACCOUNT_ID,
    };
    use crf_core::config::AppConfig;
    use crf_db::{MockRequestStore, MockUserStore};
    use crf_models::{RequestStatus, User};
    use tower::ServiceExt;

    fn users() -> MockUserStore {
        let mut users = MockUserStore::new();
        users.expect_ensure().returning(|username| {
            Ok(User {
                is_staff: username.starts_with("admin"),
                ..User::new(username)
            })
        });
        users
    }

    fn app(canvas: MockCanvasApi, users: MockUserStore, requests: MockRequestStore) -> Router {
        let canvas = CanvasService::new(Arc::new(canvas), MAIN_ACCOUNT_ID)
            .with_terms(Some(202330), Some(202410));
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(canvas),
            Arc::new(users),
            Arc::new(requests),
        );
        router().with_state(state)
    }

    fn get_as(uri: &str, username: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-remote-user", username)
            .body(Body::empty())
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

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

    #[tokio::test]
    async fn test_missing_remote_user_is_unauthorized() {
        let app = app(
            MockCanvasApi::new(),
            MockUserStore::new(),
            MockRequestStore::new(),
        );

        let response = app
            .oneshot(Request::builder().uri("/api/requests").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_mismatched_emails() {
        let mut users = users();
        users.expect_update_email().never();
        let app = app(MockCanvasApi::new(), users, MockRequestStore::new());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/me/email")
                    .header("x-remote-user", "prof1")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"new_email":"a@upenn.edu","confirm_email":"b@upenn.edu"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json(response).await;
        assert_eq!(body["base_errors"][0], crf_contracts::EMAILS_DONT_MATCH);
    }

    #[tokio::test]
    async fn test_terms() {
        let mut canvas = MockCanvasApi::new();
        canvas.expect_get_enrollment_terms().returning(|_| {
            Ok(vec![EnrollmentTerm {
                id: 4,
                name: "Fall 2023 (202330)".to_string(),
                sis_term_id: None,
                start_at: None,
                end_at: None,
            }])
        });
        canvas.expect_get_enrollment_term().returning(|_, id| {
            Ok(EnrollmentTerm {
                id,
                name: "Fall 2023".to_string(),
                sis_term_id: None,
                start_at: None,
                end_at: None,
            })
        });
        let app = app(canvas, users(), MockRequestStore::new());

        let response = app.oneshot(get_as("/api/terms", "prof1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["current"]["name"], "Fall 2023");
        assert_eq!(body["next"]["code"], 202410);
        assert_eq!(body["next"]["name"], "202410");
    }

    #[tokio::test]
    async fn test_canvas_sites() {
        let mut canvas = MockCanvasApi::new();
        canvas.expect_get_user().returning(|id, _| {
            Ok(CanvasUser {
                id: 9,
                name: "Prof One".to_string(),
                login_id: Some(id.to_string()),
                sis_user_id: None,
                email: None,
            })
        });
        canvas
            .expect_get_user_courses()
            .returning(|_, _| Ok(vec![course(5, "Old"), course(8, "Newer")]));
        let mut users = users();
        users.expect_set_canvas_id().times(1).returning(|_, _| Ok(()));
        let app = app(canvas, users, MockRequestStore::new());

        let response = app
            .oneshot(get_as("/api/users/me/canvas_sites", "prof1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body[0]["id"], 8);
        assert_eq!(body[0]["label"], "Newer (8)");
        assert_eq!(body[1]["id"], 5);
    }

    #[tokio::test]
    async fn test_canvas_sites_unknown_user() {
        let mut canvas = MockCanvasApi::new();
        canvas
            .expect_get_user()
            .returning(|id, _| Err(CanvasError::NotFound(format!("/users/{}", id))));
        let app = app(canvas, users(), MockRequestStore::new());

        let response = app
            .oneshot(get_as("/api/users/me/canvas_sites", "prof1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_other_users_request_is_hidden() {
        let mut requests = MockRequestStore::new();
        requests.expect_find_by_id().returning(|id| {
            Ok(Some(crf_models::Request {
                id: Some(id),
                ..crf_models::Request::new("ENGL-101-001 2023C", "prof2")
            }))
        });
        let app = app(MockCanvasApi::new(), users(), requests);

        let response = app.oneshot(get_as("/api/requests/1", "prof1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_provision_requires_staff() {
        let mut requests = MockRequestStore::new();
        requests.expect_find_by_id().never();
        let app = app(MockCanvasApi::new(), users(), requests);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/requests/1/provision")
                    .header("x-remote-user", "prof1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_staff_list_all_requests() {
        let mut requests = MockRequestStore::new();
        requests.expect_find_for_user().never();
        requests.expect_find_all().returning(|_| {
            Ok(vec![crf_models::Request {
                id: Some(1),
                status: RequestStatus::Approved,
                ..crf_models::Request::new("ENGL-101-001 2023C", "prof2")
            }])
        });
        requests.expect_count_all().returning(|| Ok(31));
        let app = app(MockCanvasApi::new(), users(), requests);

        let response = app
            .oneshot(get_as("/api/requests?per_page=10", "admin1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["total"], 31);
        assert_eq!(body["count"], 1);
        assert_eq!(body["limit"], 10);
        assert_eq!(body["elements"][0]["section_code"], "ENGL-101-001 2023C");
    }

    fn json_as(method: &str, uri: &str, username: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-remote-user", username)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn users_with_known_instructors() -> MockUserStore {
        let mut users = users();
        users.expect_find_many_by_username().returning(|usernames| {
            Ok(usernames.iter().map(|u| User::new(u.as_str())).collect())
        });
        users
    }

    #[tokio::test]
    async fn test_non_instructor_cannot_request_on_behalf() {
        let mut requests = MockRequestStore::new();
        requests.expect_create().never();
        let app = app(MockCanvasApi::new(), users_with_known_instructors(), requests);

        let response = app
            .oneshot(json_as(
                "POST",
                "/api/requests?instructors=prof2,prof3",
                "student1",
                r#"{"section_code":"ENGL-101-001 2023C","proxy_requester":"prof2"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json(response).await;
        assert!(body["errors"]["proxy_requester"].is_array());
    }

    #[tokio::test]
    async fn test_instructor_can_request_on_behalf() {
        let mut requests = MockRequestStore::new();
        requests.expect_find_by_section_code().returning(|_| Ok(None));
        requests.expect_create().times(1).returning(|request| {
            Ok(crf_models::Request {
                id: Some(2),
                ..request.clone()
            })
        });
        let app = app(MockCanvasApi::new(), users_with_known_instructors(), requests);

        let response = app
            .oneshot(json_as(
                "POST",
                "/api/requests?instructors=prof1,prof2",
                "prof1",
                r#"{"section_code":"ENGL-101-001 2023C","proxy_requester":"prof2"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json(response).await;
        assert_eq!(body["requester"], "prof1");
        assert_eq!(body["proxy_requester"], "prof2");
    }

    #[tokio::test]
    async fn test_edit_rejects_unoffered_proxy() {
        let mut requests = MockRequestStore::new();
        requests.expect_find_by_id().returning(|id| {
            Ok(Some(crf_models::Request {
                id: Some(id),
                ..crf_models::Request::new("ENGL-101-001 2023C", "prof1")
            }))
        });
        requests.expect_update().never();
        let app = app(MockCanvasApi::new(), users(), requests);

        let response = app
            .oneshot(json_as(
                "PATCH",
                "/api/requests/1",
                "prof1",
                r#"{"proxy_requester":"prof9","copy_from_course":99999}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json(response).await;
        assert!(body["errors"]["proxy_requester"].is_array());
        assert!(body["errors"]["copy_from_course"].is_array());
    }
}
