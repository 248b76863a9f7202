use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::{validate, validate_edit, ValidationErrors};

/// Identifier assigned by the backend when a record is created.
///
/// Backends disagree on the shape of this value, so both JSON strings and
/// numbers are accepted and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ServerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Ok(Self(text)),
            Raw::Number(number) => Ok(Self(number.to_string())),
        }
    }
}

fn deserialize_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(age) => Ok(age),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Canonical employee record, as echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub name: String,
    pub surname: String,
    #[serde(deserialize_with = "deserialize_age")]
    pub age: u32,
    #[serde(default)]
    pub id_number: String,
    pub role: String,
}

impl EmployeeRecord {
    pub fn key(&self, position: usize) -> RecordKey {
        RecordKey {
            position,
            id: self.id.clone(),
            id_number: self.id_number.clone(),
        }
    }
}

/// Address of a record in the full list, plus enough identity to notice
/// when the list has shifted underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub position: usize,
    pub id: Option<ServerId>,
    pub id_number: String,
}

impl RecordKey {
    /// Server ids win when both sides have one; otherwise the national ID
    /// number is the identity.
    pub fn matches(&self, record: &EmployeeRecord) -> bool {
        match (&self.id, &record.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.id_number == record.id_number,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "#{} (id {})", self.position, id),
            None => write!(f, "#{} (idNumber {})", self.position, self.id_number),
        }
    }
}

/// Payload of `POST /addEmployee`. The photo never leaves the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub name: String,
    pub surname: String,
    pub age: u32,
    pub id_number: String,
    pub role: String,
}

/// Local file chosen as the employee photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    path: PathBuf,
}

impl Photo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Form fields, in the order the form shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Surname,
    Age,
    IdNumber,
    Photo,
    Role,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Surname,
        Field::Age,
        Field::IdNumber,
        Field::Photo,
        Field::Role,
    ];

    /// Wire / form name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Surname => "surname",
            Field::Age => "age",
            Field::IdNumber => "idNumber",
            Field::Photo => "photo",
            Field::Role => "role",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Surname => "Surname",
            Field::Age => "Age",
            Field::IdNumber => "ID Number",
            Field::Photo => "Photo",
            Field::Role => "Role in Company",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "surname" => Ok(Field::Surname),
            "age" => Ok(Field::Age),
            "idnumber" | "id_number" | "id" => Ok(Field::IdNumber),
            "photo" => Ok(Field::Photo),
            "role" => Ok(Field::Role),
            other => Err(format!("unknown field: {other}")),
        }
    }
}

/// Unvalidated form state.
///
/// `age` stays the raw text the user typed so that validation, not parsing,
/// decides what counts as a valid age.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeDraft {
    pub name: String,
    pub surname: String,
    pub age: String,
    pub id_number: String,
    pub photo: Option<Photo>,
    pub role: String,
}

impl EmployeeDraft {
    /// Draft pre-filled from an existing record, used by the edit overlay.
    pub fn from_record(record: &EmployeeRecord) -> Self {
        Self {
            name: record.name.clone(),
            surname: record.surname.clone(),
            age: record.age.to_string(),
            id_number: record.id_number.clone(),
            photo: None,
            role: record.role.clone(),
        }
    }

    /// Sets a field from text input. For `Photo` the text is a file path and
    /// an empty value detaches the photo.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Surname => self.surname = value,
            Field::Age => self.age = value,
            Field::IdNumber => self.id_number = value,
            Field::Role => self.role = value,
            Field::Photo => {
                self.photo = if value.trim().is_empty() {
                    None
                } else {
                    Some(Photo::new(value.trim()))
                }
            }
        }
    }

    pub fn field(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::Surname => self.surname.clone(),
            Field::Age => self.age.clone(),
            Field::IdNumber => self.id_number.clone(),
            Field::Role => self.role.clone(),
            Field::Photo => self.photo.as_ref().map(Photo::file_name).unwrap_or_default(),
        }
    }

    /// Create payload for a draft that passes every registration rule.
    pub fn to_new_employee(&self) -> Result<NewEmployee, ValidationErrors> {
        let errors = validate(self);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewEmployee {
            name: self.name.clone(),
            surname: self.surname.clone(),
            age: self.parsed_age(),
            id_number: self.id_number.clone(),
            role: self.role.clone(),
        })
    }

    /// Replacement for `original` built from this draft. The server id is
    /// carried over since the edit form cannot change it.
    pub fn apply_to(&self, original: &EmployeeRecord) -> Result<EmployeeRecord, ValidationErrors> {
        let errors = validate_edit(self);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(EmployeeRecord {
            id: original.id.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
            age: self.parsed_age(),
            id_number: self.id_number.clone(),
            role: self.role.clone(),
        })
    }

    // Only called after validation accepted the age.
    fn parsed_age(&self) -> u32 {
        self.age.trim().parse().unwrap_or_default()
    }
}
