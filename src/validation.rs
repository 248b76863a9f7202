//! Field rules for employee drafts.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::domain::{EmployeeDraft, Field};

static CAPITALIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]").expect("valid pattern"));
static ID_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{13}$").expect("valid pattern"));

const MIN_AGE: u64 = 18;

/// Field-level validation failures, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

/// Checks a draft against the registration rules.
pub fn validate(draft: &EmployeeDraft) -> ValidationErrors {
    let mut errors = validate_edit(draft);
    if draft.photo.is_none() {
        errors.insert(Field::Photo, "Photo is required");
    }
    errors
}

/// Registration rules minus the photo, which edited records never carry.
pub fn validate_edit(draft: &EmployeeDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if !CAPITALIZED.is_match(&draft.name) {
        errors.insert(Field::Name, "Name must start with a capital letter");
    }
    if !CAPITALIZED.is_match(&draft.surname) {
        errors.insert(Field::Surname, "Surname must start with a capital letter");
    }
    if !ID_NUMBER.is_match(&draft.id_number) {
        errors.insert(Field::IdNumber, "ID Number must consist of 13 digits");
    }
    if let Some(message) = age_error(&draft.age) {
        errors.insert(Field::Age, message);
    }
    if !CAPITALIZED.is_match(&draft.role) {
        errors.insert(Field::Role, "Role must start with a capital letter");
    }

    errors
}

/// Ages are stored as `u32`; a whole number wider than that is out of
/// range rather than under age.
fn age_error(raw: &str) -> Option<&'static str> {
    const UNDER_AGE: &str = "Valid age is required (min 18)";
    const OUT_OF_RANGE: &str = "Age is out of range";

    let raw = raw.trim();
    match raw.parse::<u64>() {
        Ok(age) if age < MIN_AGE => Some(UNDER_AGE),
        Ok(age) if age > u64::from(u32::MAX) => Some(OUT_OF_RANGE),
        Ok(_) => None,
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => Some(OUT_OF_RANGE),
        Err(_) => Some(UNDER_AGE),
    }
}
