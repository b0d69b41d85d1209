//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Date format used for every stored and exchanged calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A tracked patient.
///
/// Serialized as `{id, name, diagnosis, firstVisit, lastVisit}`. Decoding also
/// accepts records written by older clients: numeric ids, and empty strings in
/// place of absent dates or diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Opaque unique ID, assigned at creation and never changed
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Diagnosis
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    pub diagnosis: Option<String>,
    /// Date of first contact
    #[serde(default, deserialize_with = "deserialize_opt_date")]
    pub first_visit: Option<NaiveDate>,
    /// Date of most recent contact (drives scheduling)
    #[serde(default, deserialize_with = "deserialize_opt_date")]
    pub last_visit: Option<NaiveDate>,
}

impl Patient {
    /// Create a patient from a draft with a freshly minted ID.
    pub fn new(draft: PatientDraft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            diagnosis: non_blank(draft.diagnosis),
            first_visit: draft.first_visit,
            last_visit: draft.last_visit,
        }
    }

    /// Merge a patch over this record. Fields absent from the patch are kept.
    pub fn apply(&mut self, patch: PatientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(diagnosis) = patch.diagnosis {
            self.diagnosis = non_blank(diagnosis);
        }
        if let Some(first_visit) = patch.first_visit {
            self.first_visit = first_visit;
        }
        if let Some(last_visit) = patch.last_visit {
            self.last_visit = last_visit;
        }
    }
}

/// Input for creating a patient. The ID is minted by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientDraft {
    pub name: String,
    pub diagnosis: Option<String>,
    pub first_visit: Option<NaiveDate>,
    pub last_visit: Option<NaiveDate>,
}

impl PatientDraft {
    /// Create a draft with only the required name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_diagnosis(mut self, diagnosis: impl Into<String>) -> Self {
        self.diagnosis = Some(diagnosis.into());
        self
    }

    pub fn with_first_visit(mut self, date: NaiveDate) -> Self {
        self.first_visit = Some(date);
        self
    }

    pub fn with_last_visit(mut self, date: NaiveDate) -> Self {
        self.last_visit = Some(date);
        self
    }

    /// Check the presence rules: a name must contain something besides whitespace.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("patient name is required".into());
        }
        Ok(())
    }
}

/// Partial update for a patient.
///
/// The outer `Option` says whether the field is touched; the inner one (for
/// optional fields) allows clearing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub diagnosis: Option<Option<String>>,
    pub first_visit: Option<Option<NaiveDate>>,
    pub last_visit: Option<Option<NaiveDate>>,
}

impl PatientPatch {
    /// Patch that only sets the last visit date.
    pub fn last_visit(date: NaiveDate) -> Self {
        Self {
            last_visit: Some(Some(date)),
            ..Default::default()
        }
    }

    /// Patch that replaces every field, as an edit form submission does.
    pub fn replace_all(draft: PatientDraft) -> Self {
        Self {
            name: Some(draft.name),
            diagnosis: Some(draft.diagnosis),
            first_visit: Some(draft.first_visit),
            last_visit: Some(draft.last_visit),
        }
    }

    /// Same presence rule as drafts, applied only when the name is touched.
    pub fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err("patient name cannot be blank".into()),
            _ => Ok(()),
        }
    }
}

/// Parse a `YYYY-MM-DD` date, treating an empty string as absent.
pub fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map(Some)
}

/// Blank text is stored as absent, so encoding and decoding agree.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

fn deserialize_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(non_blank(value))
}

fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        Some(s) => parse_optional_date(&s).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
