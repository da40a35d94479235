//! Email change form

use std::sync::LazyLock;

use crf_core::error::ValidationErrors;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::base::{Contract, ValidationResult};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

pub const EMAILS_DONT_MATCH: &str = "Emails don't match. Please confirm your new email address.";

/// Submitted email change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub new_email: String,
    #[serde(default)]
    pub confirm_email: String,
}

/// Validated email change, bound to the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedEmail {
    pub username: String,
    pub email: String,
}

/// Contract for [`EmailForm`], bound to a username
pub struct EmailContract {
    username: String,
}

impl EmailContract {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Returns the address when it is valid
    fn validate_email<'e>(
        field: &str,
        email: &'e str,
        errors: &mut ValidationErrors,
    ) -> Option<&'e str> {
        if email.is_empty() {
            errors.add(field, "This field is required.");
        } else if !EMAIL_PATTERN.is_match(email) {
            errors.add(field, "Enter a valid email address.");
        } else {
            return Some(email);
        }
        None
    }

    /// Validate and return the cleaned data
    pub fn clean(&self, form: &EmailForm) -> Result<CleanedEmail, ValidationErrors> {
        self.validate(form)?;
        Ok(CleanedEmail {
            username: self.username.clone(),
            email: form.new_email.trim().to_string(),
        })
    }
}

impl Contract<EmailForm> for EmailContract {
    fn validate(&self, form: &EmailForm) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        let new_email = form.new_email.trim();
        let confirm_email = form.confirm_email.trim();

        let new_email = Self::validate_email("new_email", new_email, &mut errors);
        let confirm_email = Self::validate_email("confirm_email", confirm_email, &mut errors);

        // Compared unless neither address is valid
        if (new_email.is_some() || confirm_email.is_some()) && new_email != confirm_email {
            errors.add_base(EMAILS_DONT_MATCH);
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(new_email: &str, confirm_email: &str) -> EmailForm {
        EmailForm {
            new_email: new_email.to_string(),
            confirm_email: confirm_email.to_string(),
        }
    }

    #[test]
    fn test_matching_emails_clean_with_username() {
        let contract = EmailContract::new("jdoe");
        let cleaned = contract
            .clean(&form("jdoe@upenn.edu", " jdoe@upenn.edu "))
            .unwrap();
        assert_eq!(
            cleaned,
            CleanedEmail {
                username: "jdoe".to_string(),
                email: "jdoe@upenn.edu".to_string(),
            }
        );
    }

    #[test]
    fn test_mismatched_emails_rejected() {
        let contract = EmailContract::new("jdoe");
        let errors = contract
            .validate(&form("jdoe@upenn.edu", "john@upenn.edu"))
            .unwrap_err();
        assert_eq!(errors.base_errors, vec![EMAILS_DONT_MATCH.to_string()]);
        assert!(errors.errors.is_empty());
    }

    #[test]
    fn test_invalid_email_is_field_error() {
        let contract = EmailContract::new("jdoe");
        let errors = contract.validate(&form("not-an-email", "")).unwrap_err();
        assert!(errors.has_error("new_email"));
        assert!(errors.has_error("confirm_email"));
        assert!(errors.base_errors.is_empty());
    }

    #[test]
    fn test_one_invalid_email_still_mismatches() {
        let contract = EmailContract::new("jdoe");
        let errors = contract
            .validate(&form("jdoe@upenn.edu", "jdoe@"))
            .unwrap_err();
        assert!(errors.has_error("confirm_email"));
        assert!(!errors.has_error("new_email"));
        assert_eq!(errors.base_errors, vec![EMAILS_DONT_MATCH.to_string()]);
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let form: EmailForm = serde_json::from_str(r#"{"new_email": "a@b.edu"}"#).unwrap();
        assert_eq!(form.confirm_email, "");
        assert!(EmailContract::new("a").validate(&form).is_err());
    }
}
