//! Validation of submitted and edited requests

use crf_core::error::ValidationErrors;
use crf_models::{Request, RequestStatus};

use super::fields::*;
use super::form::RequestFormSchema;
use crate::base::{validate_max_length, Contract, UserContext, ValidationResult};

const SECTION_CODE_MAX: usize = 100;
const TITLE_OVERRIDE_MAX: usize = 255;
const NOT_AN_INSTRUCTOR: &str = "can only be set by staff or an instructor of the section";

/// Contract for creating or updating a [`Request`]
///
/// With a form schema, a newly set proxy requester or copy-from course must
/// be among the offered choices, and only staff or one of the offered
/// instructors may set them. For updates, non-staff users cannot change the
/// status or edit a request that is being provisioned.
pub struct RequestContract<'a, U: UserContext> {
    user: &'a U,
    form: Option<&'a RequestFormSchema>,
    previous: Option<Previous>,
}

/// Stored values an update is compared against
struct Previous {
    status: RequestStatus,
    proxy_requester: Option<String>,
    copy_from_course: Option<i64>,
}

impl<'a, U: UserContext> RequestContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self {
            user,
            form: None,
            previous: None,
        }
    }

    pub fn with_form(mut self, form: &'a RequestFormSchema) -> Self {
        self.form = Some(form);
        self
    }

    pub fn for_update(mut self, stored: &Request) -> Self {
        self.previous = Some(Previous {
            status: stored.status,
            proxy_requester: stored.proxy_requester.clone(),
            copy_from_course: stored.copy_from_course,
        });
        self
    }

    fn previous_status(&self) -> Option<RequestStatus> {
        self.previous.as_ref().map(|previous| previous.status)
    }

    /// Staff, or one of the instructors the form was built for
    fn may_choose(&self, form: &RequestFormSchema) -> bool {
        self.user.is_staff()
            || (form.has_field(PROXY_REQUESTER)
                && form.allows(PROXY_REQUESTER, self.user.username()))
    }

    fn validate_section_code(&self, request: &Request, errors: &mut ValidationErrors) {
        if request.section_code.trim().is_empty() {
            errors.add("section_code", "can't be blank");
        }
        validate_max_length(
            "section_code",
            Some(&request.section_code),
            SECTION_CODE_MAX,
            errors,
        );
    }

    fn validate_choices(&self, request: &Request, errors: &mut ValidationErrors) {
        let Some(form) = self.form else {
            return;
        };
        let previous = self.previous.as_ref();

        let new_proxy = request.proxy_requester.as_ref().filter(|proxy| {
            previous.map_or(true, |p| p.proxy_requester.as_ref() != Some(*proxy))
        });
        if let Some(proxy) = new_proxy {
            if !form.has_field(PROXY_REQUESTER) || !form.allows(PROXY_REQUESTER, proxy) {
                errors.add(PROXY_REQUESTER, "is not one of the available choices");
            } else if !self.may_choose(form) {
                errors.add(PROXY_REQUESTER, NOT_AN_INSTRUCTOR);
            }
        }

        let new_course = request.copy_from_course.filter(|course_id| {
            previous.map_or(true, |p| p.copy_from_course != Some(*course_id))
        });
        if let Some(course_id) = new_course {
            let allowed = form
                .field(COPY_FROM_COURSE)
                .is_some_and(|field| !field.disabled)
                && form.allows(COPY_FROM_COURSE, &course_id.to_string());
            if !allowed {
                errors.add(COPY_FROM_COURSE, "is not one of the available choices");
            } else if !self.may_choose(form) {
                errors.add(COPY_FROM_COURSE, NOT_AN_INSTRUCTOR);
            }
        }
    }

    fn validate_enrollments(&self, request: &Request, errors: &mut ValidationErrors) {
        if request
            .additional_enrollments
            .iter()
            .any(|enrollment| enrollment.user.trim().is_empty())
        {
            errors.add(ADDITIONAL_ENROLLMENTS, "user can't be blank");
        }
    }

    fn validate_status_change(&self, request: &Request, errors: &mut ValidationErrors) {
        let Some(previous) = self.previous_status() else {
            return;
        };
        if self.user.is_staff() {
            return;
        }

        if !previous.is_editable() {
            errors.add_base("This request can no longer be edited");
        }
        if request.status != previous {
            errors.add("status", "can only be changed by staff");
        }
    }
}

impl<'a, U: UserContext> Contract<Request> for RequestContract<'a, U> {
    fn validate(&self, request: &Request) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_section_code(request, &mut errors);
        validate_max_length(
            TITLE_OVERRIDE,
            request.title_override.as_deref(),
            TITLE_OVERRIDE_MAX,
            &mut errors,
        );
        self.validate_choices(request, &mut errors);
        self.validate_enrollments(request, &mut errors);
        self.validate_status_change(request, &mut errors);

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        match attribute {
            "status" | "process_notes" | "canvas_course_id" => self.user.is_staff(),
            "section_code" | "requester" => self.previous.is_none(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::{RequestFormInitial, SiteOption};
    use crf_models::{AdditionalEnrollment, EnrollmentRole, User};

    fn staff() -> User {
        User {
            is_staff: true,
            ..User::new("admin1")
        }
    }

    fn request() -> Request {
        Request::new("ENGL-101-001 2023C", "prof1")
    }

    fn stored(status: RequestStatus) -> Request {
        Request {
            id: Some(1),
            status,
            ..request()
        }
    }

    fn single_instructor_form() -> RequestFormSchema {
        RequestFormSchema::build(&RequestFormInitial {
            instructors: Some(vec![User::new("prof1")]),
            proxy_requester: Some("prof1".to_string()),
            instructor_sites: vec![SiteOption {
                id: 1234,
                name: "Writing".to_string(),
            }],
        })
    }

    #[test]
    fn test_valid_request() {
        let user = User::new("prof1");
        assert!(RequestContract::new(&user).validate(&request()).is_ok());
    }

    #[test]
    fn test_blank_section_and_long_title() {
        let user = User::new("prof1");
        let mut request = Request::new("  ", "prof1");
        request.title_override = Some("x".repeat(256));

        let errors = RequestContract::new(&user).validate(&request).unwrap_err();
        assert!(errors.has_error("section_code"));
        assert!(errors.has_error(TITLE_OVERRIDE));
    }

    #[test]
    fn test_choices_checked_against_form() {
        let user = User::new("prof1");
        let form = single_instructor_form();
        let contract = RequestContract::new(&user).with_form(&form);

        let mut ok = request();
        ok.proxy_requester = Some("prof1".to_string());
        ok.copy_from_course = Some(1234);
        assert!(contract.validate(&ok).is_ok());

        let mut bad = request();
        bad.proxy_requester = Some("intruder".to_string());
        bad.copy_from_course = Some(99);
        let errors = contract.validate(&bad).unwrap_err();
        assert!(errors.has_error(PROXY_REQUESTER));
        assert!(errors.has_error(COPY_FROM_COURSE));
    }

    #[test]
    fn test_proxy_rejected_when_field_hidden() {
        let user = User::new("prof1");
        let form = RequestFormSchema::build(&RequestFormInitial::default());
        let mut request = request();
        request.proxy_requester = Some("prof1".to_string());

        let errors = RequestContract::new(&user)
            .with_form(&form)
            .validate(&request)
            .unwrap_err();
        assert!(errors.has_error(PROXY_REQUESTER));
    }

    #[test]
    fn test_non_instructor_cannot_pick_choices() {
        let user = User::new("student1");
        let form = RequestFormSchema::build(&RequestFormInitial {
            instructors: Some(vec![User::new("prof1"), User::new("prof2")]),
            ..Default::default()
        });
        let mut request = Request::new("ENGL-101-001 2023C", "student1");
        request.proxy_requester = Some("prof1".to_string());

        let errors = RequestContract::new(&user)
            .with_form(&form)
            .validate(&request)
            .unwrap_err();
        assert_eq!(errors.errors[PROXY_REQUESTER], vec![NOT_AN_INSTRUCTOR.to_string()]);

        let admin = staff();
        assert!(RequestContract::new(&admin)
            .with_form(&form)
            .validate(&request)
            .is_ok());

        let co_instructor = User::new("prof2");
        assert!(RequestContract::new(&co_instructor)
            .with_form(&form)
            .validate(&request)
            .is_ok());
    }

    #[test]
    fn test_update_only_checks_changed_choices() {
        let user = User::new("prof1");
        let form = RequestFormSchema::build(&RequestFormInitial::default());
        let mut before = stored(RequestStatus::Submitted);
        before.proxy_requester = Some("prof1".to_string());
        before.copy_from_course = Some(1234);

        let contract = RequestContract::new(&user).with_form(&form).for_update(&before);
        assert!(contract.validate(&before).is_ok());

        let mut changed = before.clone();
        changed.copy_from_course = Some(99999);
        let errors = contract.validate(&changed).unwrap_err();
        assert!(errors.has_error(COPY_FROM_COURSE));
        assert!(!errors.has_error(PROXY_REQUESTER));
    }

    #[test]
    fn test_blank_enrollment_user() {
        let user = User::new("prof1");
        let mut request = request();
        request.additional_enrollments = vec![AdditionalEnrollment {
            user: " ".to_string(),
            role: EnrollmentRole::Ta,
        }];
        let errors = RequestContract::new(&user).validate(&request).unwrap_err();
        assert!(errors.has_error(ADDITIONAL_ENROLLMENTS));
    }

    #[test]
    fn test_status_change_requires_staff() {
        let user = User::new("prof1");
        let mut request = request();
        request.status = RequestStatus::Approved;

        let errors = RequestContract::new(&user)
            .for_update(&stored(RequestStatus::Submitted))
            .validate(&request)
            .unwrap_err();
        assert!(errors.has_error("status"));

        let admin = staff();
        assert!(RequestContract::new(&admin)
            .for_update(&stored(RequestStatus::Submitted))
            .validate(&request)
            .is_ok());
    }

    #[test]
    fn test_completed_request_locked_for_requester() {
        let user = User::new("prof1");
        let mut request = request();
        request.status = RequestStatus::Completed;

        let errors = RequestContract::new(&user)
            .for_update(&stored(RequestStatus::Completed))
            .validate(&request)
            .unwrap_err();
        assert_eq!(errors.base_errors.len(), 1);
        assert!(!errors.has_error("status"));
    }

    #[test]
    fn test_writable_attributes() {
        let user = User::new("prof1");
        let admin = staff();
        assert!(!RequestContract::new(&user).is_writable("status"));
        assert!(RequestContract::new(&admin).is_writable("status"));
        assert!(!RequestContract::new(&user)
            .for_update(&stored(RequestStatus::Submitted))
            .is_writable("section_code"));
    }
}
