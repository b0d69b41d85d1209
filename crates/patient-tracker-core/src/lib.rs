//! Patient Tracker Core Library
//!
//! Local-first patient follow-up tracking with appointment reminders.
//!
//! # Architecture
//!
//! ```text
//!   UI (Swift / Kotlin / web)
//!            │  plain records in, plain records out
//!            ▼
//!   ┌─────────────────────────────┐
//!   │       PatientService        │
//!   └──────┬──────────┬───────────┘
//!          │          │
//!          ▼          ▼
//!   PatientStore    query::filter ──► Schedule (next date + urgency)
//!          │
//!          ▼  whole list as JSON, after every mutation
//!   KeyValueSlot (SQLite / file / memory)
//! ```
//!
//! # Core Principle
//!
//! **Schedule status is never stored.** It is recomputed from the last visit
//! and today's date on every read.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, drafts, patches, Urgency, ScheduleStatus)
//! - [`schedule`]: Next-appointment arithmetic and urgency classification
//! - [`query`]: Case-insensitive search over name and diagnosis
//! - [`store`]: Ordered patient collection with write-through persistence
//! - [`storage`]: Key-value slots (SQLite, file, memory)
//! - [`service`]: Entry point for presentation layers
//! - [`display`]: Labels and tones for rendering
//! - [`config`]: Tracker configuration

pub mod config;
pub mod display;
pub mod models;
pub mod query;
pub mod schedule;
pub mod service;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use display::StatusTone;
pub use models::{
    Patient, PatientDraft, PatientPatch, PatientWithStatus, ScheduleStatus, Urgency,
};
pub use schedule::Schedule;
pub use service::{Clock, FixedClock, PatientService, SystemClock};
pub use storage::{FileSlot, KeyValueSlot, MemorySlot, SqliteSlot};
pub use store::{PatientStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PatientTrackerError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<StoreError> for PatientTrackerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => PatientTrackerError::NotFound(id),
            StoreError::InvalidDraft(reason) => PatientTrackerError::InvalidInput(reason),
            StoreError::PersistenceUnavailable(e) => PatientTrackerError::StorageError(e.to_string()),
            StoreError::Serialization(e) => PatientTrackerError::SerializationError(e.to_string()),
        }
    }
}

impl From<storage::StorageError> for PatientTrackerError {
    fn from(e: storage::StorageError) -> Self {
        PatientTrackerError::StorageError(e.to_string())
    }
}

impl From<config::ConfigError> for PatientTrackerError {
    fn from(e: config::ConfigError) -> Self {
        PatientTrackerError::InvalidInput(e.to_string())
    }
}

impl From<chrono::ParseError> for PatientTrackerError {
    fn from(e: chrono::ParseError) -> Self {
        PatientTrackerError::InvalidInput(format!("Invalid date (expected YYYY-MM-DD): {}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for PatientTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PatientTrackerError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a tracker backed by the SQLite database at the given path.
#[uniffi::export]
pub fn open_tracker(path: String) -> Result<Arc<PatientTracker>, PatientTrackerError> {
    let slot = SqliteSlot::open(&path)?;
    Ok(PatientTracker::wrap(PatientService::new(slot)))
}

/// Same as [`open_tracker`] with a JSON configuration (see [`TrackerConfig`]).
#[uniffi::export]
pub fn open_tracker_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<PatientTracker>, PatientTrackerError> {
    let config = TrackerConfig::from_json_str(&config_json)?;
    let slot = SqliteSlot::open(&path)?;
    let service = PatientService::with_config(slot, &config, Box::new(SystemClock))?;
    Ok(PatientTracker::wrap(service))
}

/// Create an in-memory tracker (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory() -> Result<Arc<PatientTracker>, PatientTrackerError> {
    let slot = SqliteSlot::open_in_memory()?;
    Ok(PatientTracker::wrap(PatientService::new(slot)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe service wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PatientTracker {
    service: Arc<Mutex<PatientService<SqliteSlot>>>,
}

impl PatientTracker {
    fn wrap(service: PatientService<SqliteSlot>) -> Arc<Self> {
        Arc::new(Self {
            service: Arc::new(Mutex::new(service)),
        })
    }
}

#[uniffi::export]
impl PatientTracker {
    /// Patients matching a search term, annotated with their schedule status.
    pub fn list_patients(&self, term: String) -> Result<Vec<FfiPatientStatus>, PatientTrackerError> {
        let service = self.service.lock()?;
        let listed = service.list_with_status_now(&term);
        Ok(listed.into_iter().map(|p| p.into()).collect())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, PatientTrackerError> {
        let service = self.service.lock()?;
        Ok(service.get_patient(&id).cloned().map(|p| p.into()))
    }

    /// Create a new patient. Dates are `YYYY-MM-DD`; empty strings mean absent.
    pub fn create_patient(
        &self,
        name: String,
        diagnosis: Option<String>,
        first_visit: Option<String>,
        last_visit: Option<String>,
    ) -> Result<FfiPatient, PatientTrackerError> {
        let draft = parse_draft(name, diagnosis, first_visit, last_visit)?;
        let mut service = self.service.lock()?;
        let patient = service.create_patient(draft)?;
        Ok(patient.into())
    }

    /// Replace a patient's fields with an edit form submission.
    pub fn edit_patient(
        &self,
        id: String,
        name: String,
        diagnosis: Option<String>,
        first_visit: Option<String>,
        last_visit: Option<String>,
    ) -> Result<FfiPatient, PatientTrackerError> {
        let draft = parse_draft(name, diagnosis, first_visit, last_visit)?;
        let mut service = self.service.lock()?;
        let patient = service.edit_patient(&id, PatientPatch::replace_all(draft))?;
        Ok(patient.into())
    }

    /// Delete a patient. Returns false if no patient had this ID.
    pub fn delete_patient(&self, id: String) -> Result<bool, PatientTrackerError> {
        let mut service = self.service.lock()?;
        Ok(service.delete_patient(&id)?)
    }

    /// Record a visit today.
    pub fn mark_visited_today(&self, id: String) -> Result<FfiPatient, PatientTrackerError> {
        let mut service = self.service.lock()?;
        let patient = service.mark_visited_today(&id)?;
        Ok(patient.into())
    }
}

fn parse_draft(
    name: String,
    diagnosis: Option<String>,
    first_visit: Option<String>,
    last_visit: Option<String>,
) -> Result<PatientDraft, PatientTrackerError> {
    let parse = |value: Option<String>| -> Result<_, PatientTrackerError> {
        match value {
            Some(s) => Ok(models::parse_optional_date(&s)?),
            None => Ok(None),
        }
    };

    Ok(PatientDraft {
        name,
        diagnosis: diagnosis.filter(|d| !d.trim().is_empty()),
        first_visit: parse(first_visit)?,
        last_visit: parse(last_visit)?,
    })
}

fn format_date(date: Option<chrono::NaiveDate>) -> Option<String> {
    date.map(|d| d.format(models::DATE_FORMAT).to_string())
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub diagnosis: Option<String>,
    pub first_visit: Option<String>,
    pub last_visit: Option<String>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            diagnosis: patient.diagnosis,
            first_visit: format_date(patient.first_visit),
            last_visit: format_date(patient.last_visit),
        }
    }
}

/// FFI-safe patient with schedule status and ready-to-render labels.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientStatus {
    pub patient: FfiPatient,
    pub next_date: Option<String>,
    /// One of unscheduled, overdue, due_today, due_soon, scheduled
    pub urgency: String,
    pub days: Option<i64>,
    pub tone: String,
    pub status_label: String,
    pub diagnosis_label: String,
    pub first_visit_label: String,
    pub last_visit_label: String,
    pub next_date_label: String,
}

impl From<PatientWithStatus> for FfiPatientStatus {
    fn from(item: PatientWithStatus) -> Self {
        let urgency = item.status.urgency;
        let kind = match urgency {
            Urgency::Unscheduled => "unscheduled",
            Urgency::Overdue(_) => "overdue",
            Urgency::DueToday => "due_today",
            Urgency::DueSoon(_) => "due_soon",
            Urgency::Scheduled => "scheduled",
        };
        let diagnosis_label = display::diagnosis_label(&item.patient).to_string();
        let first_visit_label = display::format_long_date(item.patient.first_visit);
        let last_visit_label = display::format_long_date(item.patient.last_visit);
        Self {
            patient: item.patient.into(),
            next_date: format_date(item.status.next_date),
            urgency: kind.into(),
            days: urgency.days(),
            tone: StatusTone::from(urgency).as_str().into(),
            status_label: display::status_label(&urgency),
            diagnosis_label,
            first_visit_label,
            last_visit_label,
            next_date_label: display::format_long_date(item.status.next_date),
        }
    }
}
