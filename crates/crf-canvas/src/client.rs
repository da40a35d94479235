//! Canvas REST client
//!
//! `CanvasApi` maps one method to one Canvas endpoint. Listing endpoints
//! follow `Link: <...>; rel="next"` headers until the last page.

use std::time::Duration;

use async_trait::async_trait;
use crf_core::config::CanvasConfig;
use reqwest::header::LINK;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::error::{CanvasError, CanvasResult};
use crate::types::*;

const PER_PAGE: &str = "100";

/// Canvas endpoints used by the course request form
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CanvasApi: Send + Sync {
    async fn get_account(&self, account_id: i64) -> CanvasResult<Account>;

    async fn get_subaccounts(&self, account_id: i64, recursive: bool) -> CanvasResult<Vec<Account>>;

    /// `id_type` is a Canvas id prefix such as `sis_login_id`
    async fn get_user(&self, id: &str, id_type: &str) -> CanvasResult<CanvasUser>;

    async fn get_enrollment_terms(&self, account_id: i64) -> CanvasResult<Vec<EnrollmentTerm>>;

    async fn get_enrollment_term(&self, account_id: i64, term_id: i64) -> CanvasResult<EnrollmentTerm>;

    async fn create_course(&self, account_id: i64, course: &CourseParams) -> CanvasResult<Course>;

    async fn create_course_section(
        &self,
        course_id: i64,
        section: &SectionParams,
        enable_sis_reactivation: bool,
    ) -> CanvasResult<CourseSection>;

    async fn get_course_by_sis_id(&self, sis_course_id: &str) -> CanvasResult<Course>;

    async fn update_course(&self, course_id: i64, course: &CourseParams) -> CanvasResult<Course>;

    async fn get_calendar_events(
        &self,
        context_codes: &[String],
        all_events: bool,
    ) -> CanvasResult<Vec<CalendarEvent>>;

    async fn delete_calendar_event(&self, event_id: i64, cancel_reason: &str) -> CanvasResult<CalendarEvent>;

    async fn get_discussion_topics(
        &self,
        course_id: i64,
        only_announcements: bool,
    ) -> CanvasResult<Vec<DiscussionTopic>>;

    async fn delete_discussion_topic(&self, course_id: i64, topic_id: i64) -> CanvasResult<()>;

    async fn get_user_courses(&self, user_id: i64, enrollment_type: &str) -> CanvasResult<Vec<Course>>;
}

/// `reqwest`-backed Canvas client
#[derive(Clone)]
pub struct CanvasClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl CanvasClient {
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> CanvasResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("course-request-form/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            token: token.into(),
        })
    }

    /// Client for the test or production instance, depending on `debug`
    pub fn from_config(config: &CanvasConfig) -> CanvasResult<Self> {
        Self::new(
            config.base_url(),
            config.api_key(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/api/v1/<segments...>`, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> CanvasResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CanvasError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn execute(&self, request: RequestBuilder) -> CanvasResult<Response> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, %path, "Canvas request failed");

        if status == StatusCode::NOT_FOUND {
            return Err(CanvasError::NotFound(path));
        }
        Err(CanvasError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> CanvasResult<T> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| CanvasError::Decode(e.to_string()))
    }

    /// Fetch every page of a listing endpoint
    async fn fetch_pages<P: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> CanvasResult<Vec<P>> {
        let mut pages = Vec::new();
        let mut request = self
            .http
            .get(url)
            .query(query)
            .query(&[("per_page", PER_PAGE)]);

        loop {
            let response = self.execute(request).await?;
            let next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_link);

            let page = response
                .json::<P>()
                .await
                .map_err(|e| CanvasError::Decode(e.to_string()))?;
            pages.push(page);

            match next {
                Some(next) => request = self.http.get(Url::parse(&next)?),
                None => break,
            }
        }

        Ok(pages)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> CanvasResult<Vec<T>> {
        let pages = self.fetch_pages::<Vec<T>>(url, query).await?;
        Ok(pages.into_iter().flatten().collect())
    }
}

#[async_trait]
impl CanvasApi for CanvasClient {
    async fn get_account(&self, account_id: i64) -> CanvasResult<Account> {
        let url = self.endpoint(&["accounts", &account_id.to_string()])?;
        self.fetch(self.http.get(url)).await
    }

    async fn get_subaccounts(&self, account_id: i64, recursive: bool) -> CanvasResult<Vec<Account>> {
        let url = self.endpoint(&["accounts", &account_id.to_string(), "sub_accounts"])?;
        self.fetch_list(url, &[("recursive", recursive.to_string())])
            .await
    }

    async fn get_user(&self, id: &str, id_type: &str) -> CanvasResult<CanvasUser> {
        let url = self.endpoint(&["users", &format!("{}:{}", id_type, id)])?;
        self.fetch(self.http.get(url)).await
    }

    async fn get_enrollment_terms(&self, account_id: i64) -> CanvasResult<Vec<EnrollmentTerm>> {
        let url = self.endpoint(&["accounts", &account_id.to_string(), "terms"])?;
        let pages = self.fetch_pages::<EnrollmentTermsPage>(url, &[]).await?;
        Ok(pages
            .into_iter()
            .flat_map(|page| page.enrollment_terms)
            .collect())
    }

    async fn get_enrollment_term(&self, account_id: i64, term_id: i64) -> CanvasResult<EnrollmentTerm> {
        let url = self.endpoint(&[
            "accounts",
            &account_id.to_string(),
            "terms",
            &term_id.to_string(),
        ])?;
        self.fetch(self.http.get(url)).await
    }

    async fn create_course(&self, account_id: i64, course: &CourseParams) -> CanvasResult<Course> {
        let url = self.endpoint(&["accounts", &account_id.to_string(), "courses"])?;
        self.fetch(self.http.post(url).json(&json!({ "course": course })))
            .await
    }

    async fn create_course_section(
        &self,
        course_id: i64,
        section: &SectionParams,
        enable_sis_reactivation: bool,
    ) -> CanvasResult<CourseSection> {
        let url = self.endpoint(&["courses", &course_id.to_string(), "sections"])?;
        let body = json!({
            "course_section": section,
            "enable_sis_reactivation": enable_sis_reactivation,
        });
        self.fetch(self.http.post(url).json(&body)).await
    }

    async fn get_course_by_sis_id(&self, sis_course_id: &str) -> CanvasResult<Course> {
        let url = self.endpoint(&["courses", &format!("sis_course_id:{}", sis_course_id)])?;
        self.fetch(self.http.get(url)).await
    }

    async fn update_course(&self, course_id: i64, course: &CourseParams) -> CanvasResult<Course> {
        let url = self.endpoint(&["courses", &course_id.to_string()])?;
        self.fetch(self.http.put(url).json(&json!({ "course": course })))
            .await
    }

    async fn get_calendar_events(
        &self,
        context_codes: &[String],
        all_events: bool,
    ) -> CanvasResult<Vec<CalendarEvent>> {
        let url = self.endpoint(&["calendar_events"])?;
        let mut query: Vec<(&str, String)> = context_codes
            .iter()
            .map(|code| ("context_codes[]", code.clone()))
            .collect();
        query.push(("all_events", all_events.to_string()));
        self.fetch_list(url, &query).await
    }

    async fn delete_calendar_event(&self, event_id: i64, cancel_reason: &str) -> CanvasResult<CalendarEvent> {
        let url = self.endpoint(&["calendar_events", &event_id.to_string()])?;
        self.fetch(self.http.delete(url).query(&[("cancel_reason", cancel_reason)]))
            .await
    }

    async fn get_discussion_topics(
        &self,
        course_id: i64,
        only_announcements: bool,
    ) -> CanvasResult<Vec<DiscussionTopic>> {
        let url = self.endpoint(&["courses", &course_id.to_string(), "discussion_topics"])?;
        self.fetch_list(url, &[("only_announcements", only_announcements.to_string())])
            .await
    }

    async fn delete_discussion_topic(&self, course_id: i64, topic_id: i64) -> CanvasResult<()> {
        let url = self.endpoint(&[
            "courses",
            &course_id.to_string(),
            "discussion_topics",
            &topic_id.to_string(),
        ])?;
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    async fn get_user_courses(&self, user_id: i64, enrollment_type: &str) -> CanvasResult<Vec<Course>> {
        let url = self.endpoint(&["users", &user_id.to_string(), "courses"])?;
        self.fetch_list(url, &[("enrollment_type", enrollment_type.to_string())])
            .await
    }
}

/// Target of the `rel="next"` entry in a `Link` header
pub(crate) fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| param.trim() == r#"rel="next""#);
        is_next.then(|| {
            target
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

/// First message from a Canvas error body, or the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("errors")
                .and_then(|errors| errors.get(0))
                .and_then(|error| error.get("message"))
                .or_else(|| value.get("message"))
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
