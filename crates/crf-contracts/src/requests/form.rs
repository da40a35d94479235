//! Request form field set and conditional visibility

use crf_models::User;
use serde::Serialize;

use super::fields::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Select,
    Text,
    Textarea,
    Checkbox,
    EnrollmentList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: String,
    pub widget: Widget,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl FormField {
    fn new(name: &'static str, label: &str, widget: Widget) -> Self {
        Self {
            name,
            label: label.to_string(),
            widget,
            disabled: false,
            choices: Vec::new(),
        }
    }
}

/// A Canvas site an instructor can copy content from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteOption {
    pub id: i64,
    pub name: String,
}

impl SiteOption {
    /// `"<name> (<id>)"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

/// Data the form is initialised with
#[derive(Debug, Clone, Default)]
pub struct RequestFormInitial {
    /// Instructors of the section; `None` hides the instructor-only fields
    pub instructors: Option<Vec<User>>,
    /// Set when the section has exactly one instructor
    pub proxy_requester: Option<String>,
    /// Canvas sites taught by the single instructor
    pub instructor_sites: Vec<SiteOption>,
}

impl RequestFormInitial {
    /// The instructor whose sites feed `copy_from_course`
    pub fn single_instructor(&self) -> Option<&User> {
        self.proxy_requester.as_ref()?;
        self.instructors.as_ref()?.first()
    }
}

/// Visible request form fields, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestFormSchema {
    pub fields: Vec<FormField>,
}

impl RequestFormSchema {
    pub fn build(initial: &RequestFormInitial) -> Self {
        let mut proxy_requester =
            FormField::new(PROXY_REQUESTER, "Request on behalf of", Widget::Select);
        let mut copy_from_course =
            FormField::new(COPY_FROM_COURSE, "Copy from course", Widget::Select);

        let mut fields = Vec::with_capacity(8);

        if let Some(instructors) = &initial.instructors {
            proxy_requester.choices = instructors
                .iter()
                .map(|instructor| Choice {
                    value: instructor.username.clone(),
                    label: instructor.display_name(),
                })
                .collect();

            if initial.single_instructor().is_some() {
                copy_from_course.choices = site_choices(&initial.instructor_sites);
                copy_from_course.disabled = copy_from_course.choices.is_empty();
                proxy_requester.disabled = true;
            }

            fields.push(proxy_requester);
        }

        fields.push(FormField::new(TITLE_OVERRIDE, "Title override", Widget::Text));
        if initial.instructors.is_some() {
            fields.push(copy_from_course);
        }
        fields.push(FormField::new(RESERVES, "Reserves", Widget::Checkbox));
        fields.push(FormField::new(LPS_ONLINE, "LPS online", Widget::Checkbox));
        fields.push(FormField::new(
            EXCLUDE_ANNOUNCEMENTS,
            "Exclude announcements",
            Widget::Checkbox,
        ));
        fields.push(FormField::new(
            ADDITIONAL_ENROLLMENTS,
            "Additional enrollments",
            Widget::EnrollmentList,
        ));
        fields.push(FormField::new(
            ADDITIONAL_INSTRUCTIONS,
            "Additional instructions",
            Widget::Textarea,
        ));

        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Whether `value` is one of the field's choices; fields without
    /// choices accept anything
    pub fn allows(&self, name: &str, value: &str) -> bool {
        match self.field(name) {
            Some(field) if !field.choices.is_empty() => {
                field.choices.iter().any(|choice| choice.value == value)
            }
            _ => true,
        }
    }
}

/// Sites newest first
fn site_choices(sites: &[SiteOption]) -> Vec<Choice> {
    let mut sites: Vec<&SiteOption> = sites.iter().collect();
    sites.sort_by(|a, b| b.id.cmp(&a.id));
    sites
        .into_iter()
        .map(|site| Choice {
            value: site.id.to_string(),
            label: site.label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instructor(username: &str, first: &str, last: &str) -> User {
        User {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..User::new(username)
        }
    }

    fn site(id: i64, name: &str) -> SiteOption {
        SiteOption {
            id,
            name: name.to_string(),
        }
    }

    fn names(schema: &RequestFormSchema) -> Vec<&str> {
        schema.fields.iter().map(|f| f.name).collect()
    }

    #[test]
    fn test_without_instructors_hides_fields() {
        let schema = RequestFormSchema::build(&RequestFormInitial::default());
        assert!(!schema.has_field(PROXY_REQUESTER));
        assert!(!schema.has_field(COPY_FROM_COURSE));
        assert_eq!(
            names(&schema),
            vec![
                TITLE_OVERRIDE,
                RESERVES,
                LPS_ONLINE,
                EXCLUDE_ANNOUNCEMENTS,
                ADDITIONAL_ENROLLMENTS,
                ADDITIONAL_INSTRUCTIONS,
            ]
        );
    }

    #[test]
    fn test_multiple_instructors_are_proxy_choices() {
        let initial = RequestFormInitial {
            instructors: Some(vec![
                instructor("prof1", "Ada", "Lovelace"),
                instructor("prof2", "Alan", "Turing"),
            ]),
            ..Default::default()
        };
        let schema = RequestFormSchema::build(&initial);

        let proxy = schema.field(PROXY_REQUESTER).unwrap();
        assert_eq!(proxy.label, "Request on behalf of");
        assert!(!proxy.disabled);
        assert_eq!(
            proxy.choices.iter().map(|c| c.value.as_str()).collect::<Vec<_>>(),
            vec!["prof1", "prof2"]
        );

        let copy = schema.field(COPY_FROM_COURSE).unwrap();
        assert!(copy.choices.is_empty());
        assert!(!copy.disabled);
    }

    #[test]
    fn test_single_instructor_sites_sorted_descending() {
        let initial = RequestFormInitial {
            instructors: Some(vec![instructor("prof1", "Ada", "Lovelace")]),
            proxy_requester: Some("prof1".to_string()),
            instructor_sites: vec![site(12, "Writing"), site(40, "Poetry"), site(3, "Drama")],
        };
        let schema = RequestFormSchema::build(&initial);

        assert!(schema.field(PROXY_REQUESTER).unwrap().disabled);
        let copy = schema.field(COPY_FROM_COURSE).unwrap();
        assert!(!copy.disabled);
        assert_eq!(
            copy.choices.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
            vec!["Poetry (40)", "Writing (12)", "Drama (3)"]
        );
        assert!(schema.allows(COPY_FROM_COURSE, "12"));
        assert!(!schema.allows(COPY_FROM_COURSE, "99"));
    }

    #[test]
    fn test_single_instructor_without_sites_disables_copy() {
        let initial = RequestFormInitial {
            instructors: Some(vec![instructor("prof1", "Ada", "Lovelace")]),
            proxy_requester: Some("prof1".to_string()),
            instructor_sites: Vec::new(),
        };
        let schema = RequestFormSchema::build(&initial);

        let copy = schema.field(COPY_FROM_COURSE).unwrap();
        assert!(copy.disabled);
        assert!(copy.choices.is_empty());
    }
}
