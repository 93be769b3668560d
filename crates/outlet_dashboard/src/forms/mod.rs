//! Form validation and DTO builders for the user and employee screens.
//!
//! Validation failures and backend 422 responses end up in the same
//! field-keyed [`FieldErrors`] map so a form can render both inline.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use outlet_dashboard_client::{ClientError, FieldErrorMap};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

pub mod employee;
pub mod user;

pub use employee::EmployeeForm;
pub use user::UserForm;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Indonesian mobile numbers: 08xx, 628xx or +628xx, 10 to 15 digits.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+62|62|0)8[1-9][0-9]{6,11}$").expect("phone regex is valid")
});

pub(crate) fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s.trim())
}

pub(crate) fn is_valid_phone(s: &str) -> bool {
    let compact: String = s.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    PHONE_RE.is_match(&compact)
}

/// Trimmed value, or `None` for blank input.
pub(crate) fn blank_to_none(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message for `field`, as shown under the input.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field)?.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Merge backend validation errors, renaming backend field names through
    /// `aliases` (`(backend, form)` pairs). Duplicate messages are dropped.
    pub fn merge_server(&mut self, errors: &FieldErrorMap, aliases: &[(&str, &str)]) {
        for (field, messages) in errors {
            let field = aliases
                .iter()
                .find(|(backend, _)| backend == field)
                .map(|(_, form)| *form)
                .unwrap_or(field.as_str());
            let entry = self.0.entry(field.to_string()).or_default();
            for m in messages {
                if !entry.contains(m) {
                    entry.push(m.clone());
                }
            }
        }
    }

    /// Field errors from a failed submission, if the failure was a 422.
    pub fn from_client_error(err: &ClientError, aliases: &[(&str, &str)]) -> Option<Self> {
        let map = err.field_errors()?;
        let mut errors = Self::new();
        errors.merge_server(map, aliases);
        Some(errors)
    }

    pub(crate) fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_and_phone_formats() {
        assert!(is_valid_email("rina@example.com"));
        assert!(!is_valid_email("rina@example"));
        assert!(!is_valid_email("rina example.com"));
        assert!(is_valid_phone("0812-3456-7890"));
        assert!(is_valid_phone("+6281234567890"));
        assert!(!is_valid_phone("021123456"));
        assert!(!is_valid_phone("08123"));
    }

    #[test]
    fn merge_server_maps_aliases_and_dedupes() {
        let mut errors = FieldErrors::new();
        errors.add("join_date", "Join date is required.");
        let mut server = FieldErrorMap::new();
        server.insert("tanggal_masuk".into(), vec!["Join date is required.".into()]);
        server.insert("nik".into(), vec!["The nik has already been taken.".into()]);
        errors.merge_server(&server, &[("tanggal_masuk", "join_date")]);

        assert_eq!(errors.get("join_date").map(<[String]>::len), Some(1));
        assert_eq!(errors.first("nik"), Some("The nik has already been taken."));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn only_validation_errors_carry_fields() {
        let err = ClientError::Server {
            status: 500,
            body: String::new(),
        };
        assert!(FieldErrors::from_client_error(&err, &[]).is_none());
    }
}
