//! Ordered in-memory patient collection, written through to a storage slot.
//!
//! Every mutation is applied in memory first and then the whole collection is
//! written back. A failed write is reported, but the in-memory change stands.

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::{ConfigError, TrackerConfig, DEFAULT_STORAGE_KEY};
use crate::models::{Patient, PatientDraft, PatientPatch};
use crate::storage::{KeyValueSlot, StorageError};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Invalid patient data: {0}")]
    InvalidDraft(String),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StorageError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Serialize a patient list to the stored JSON form.
pub fn encode_patients(patients: &[Patient]) -> Result<String, serde_json::Error> {
    serde_json::to_string(patients)
}

/// Parse the stored JSON form.
pub fn decode_patients(raw: &str) -> Result<Vec<Patient>, serde_json::Error> {
    // Older clients wrote `null` when nothing was stored yet.
    let patients: Option<Vec<Patient>> = serde_json::from_str(raw)?;
    Ok(patients.unwrap_or_default())
}

/// The patient collection plus the slot it persists to.
pub struct PatientStore<S: KeyValueSlot> {
    slot: S,
    key: String,
    patients: Vec<Patient>,
}

impl<S: KeyValueSlot> PatientStore<S> {
    /// Open a store under the default storage key.
    pub fn open(slot: S) -> Self {
        Self::open_key(slot, DEFAULT_STORAGE_KEY.to_string())
    }

    /// Open a store under the configured key. The configuration is validated first.
    pub fn with_config(slot: S, config: &TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::open_key(slot, config.storage_key.clone()))
    }

    /// Load whatever the slot holds under `key`.
    fn open_key(slot: S, key: String) -> Self {
        let mut store = Self {
            slot,
            key,
            patients: Vec::new(),
        };
        store.patients = store.load();
        store
    }

    /// Read the collection from the slot.
    ///
    /// Missing, unreadable or malformed data yields an empty collection.
    pub fn load(&self) -> Vec<Patient> {
        let raw = match self.slot.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Could not read stored patients, starting empty");
                return Vec::new();
            }
        };

        match decode_patients(&raw) {
            Ok(patients) => {
                tracing::debug!(key = %self.key, count = patients.len(), "Loaded patients");
                patients
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Stored patients are malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Discard in-memory state and reload from the slot.
    pub fn reload(&mut self) {
        self.patients = self.load();
    }

    /// Write the full collection, replacing what the slot held.
    pub fn persist(&mut self) -> StoreResult<()> {
        let raw = encode_patients(&self.patients)?;
        if let Err(e) = self.slot.set(&self.key, &raw) {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist patients");
            return Err(e.into());
        }
        tracing::debug!(key = %self.key, count = self.patients.len(), "Persisted patients");
        Ok(())
    }

    /// Create a patient at the end of the list.
    pub fn add(&mut self, draft: PatientDraft) -> StoreResult<Patient> {
        draft.validate().map_err(StoreError::InvalidDraft)?;

        let mut patient = Patient::new(draft);
        while self.contains(&patient.id) {
            patient.id = uuid::Uuid::new_v4().to_string();
        }

        self.patients.push(patient.clone());
        tracing::info!(patient_id = %patient.id, "Added patient");
        self.persist()?;
        Ok(patient)
    }

    /// Merge a patch over an existing patient.
    pub fn update(&mut self, id: &str, patch: PatientPatch) -> StoreResult<Patient> {
        patch.validate().map_err(StoreError::InvalidDraft)?;

        let patient = self
            .patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patient.apply(patch);
        let updated = patient.clone();

        tracing::info!(patient_id = %id, "Updated patient");
        self.persist()?;
        Ok(updated)
    }

    /// Remove a patient. Unknown IDs are not an error.
    ///
    /// Returns whether a patient was removed.
    pub fn remove(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.patients.len();
        self.patients.retain(|p| p.id != id);
        let removed = self.patients.len() < before;

        if removed {
            tracing::info!(patient_id = %id, "Removed patient");
        } else {
            tracing::debug!(patient_id = %id, "Remove requested for unknown patient");
        }
        self.persist()?;
        Ok(removed)
    }

    /// Set the last visit to `today`.
    pub fn touch_visit_today(&mut self, id: &str, today: NaiveDate) -> StoreResult<Patient> {
        self.update(id, PatientPatch::last_visit(today))
    }

    /// Get a patient by ID.
    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All patients in insertion order.
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut S {
        &mut self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlot;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup_store() -> PatientStore<MemorySlot> {
        PatientStore::open(MemorySlot::new())
    }

    #[test]
    fn test_open_empty() {
        let store = setup_store();
        assert!(store.is_empty());
        assert_eq!(store.storage_key(), "pacientes");
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let store = PatientStore::open(MemorySlot::with_value("pacientes", "{not json"));
        assert!(store.is_empty());

        let store = PatientStore::open(MemorySlot::with_value("pacientes", r#"{"id":"1"}"#));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_null_is_empty() {
        let store = PatientStore::open(MemorySlot::with_value("pacientes", "null"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_and_get() {
        let mut store = setup_store();

        let draft = PatientDraft::new("Ana Ruiz")
            .with_diagnosis("Hipertensión")
            .with_last_visit(date("2024-01-15"));
        let patient = store.add(draft).unwrap();

        let retrieved = store.get(&patient.id).unwrap();
        assert_eq!(retrieved.name, "Ana Ruiz");
        assert_eq!(retrieved.diagnosis, Some("Hipertensión".into()));
        assert_eq!(retrieved.last_visit, Some(date("2024-01-15")));
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut store = setup_store();
        store.add(PatientDraft::new("Uno")).unwrap();
        store.add(PatientDraft::new("Dos")).unwrap();
        store.add(PatientDraft::new("Tres")).unwrap();

        let names: Vec<_> = store.patients().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Uno", "Dos", "Tres"]);
    }

    #[test]
    fn test_add_requires_name() {
        let mut store = setup_store();
        let result = store.add(PatientDraft::new("  "));
        assert!(matches!(result, Err(StoreError::InvalidDraft(_))));
        assert!(store.is_empty());
        assert_eq!(store.slot().raw("pacientes"), None);
    }

    #[test]
    fn test_add_persists() {
        let mut store = setup_store();
        let patient = store.add(PatientDraft::new("Ana")).unwrap();

        let raw = store.slot().raw("pacientes").unwrap();
        let stored = decode_patients(raw).unwrap();
        assert_eq!(stored, vec![patient]);
    }

    #[test]
    fn test_update_merges() {
        let mut store = setup_store();
        let patient = store
            .add(PatientDraft::new("Ana").with_diagnosis("Asma"))
            .unwrap();

        let updated = store
            .update(
                &patient.id,
                PatientPatch {
                    name: Some("Ana Ruiz".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, patient.id);
        assert_eq!(updated.name, "Ana Ruiz");
        assert_eq!(updated.diagnosis, Some("Asma".into()));
        assert_eq!(store.get(&patient.id), Some(&updated));
    }

    #[test]
    fn test_update_not_found() {
        let mut store = setup_store();
        let result = store.update("missing", PatientPatch::default());
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "missing"));
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let mut store = setup_store();
        let patient = store.add(PatientDraft::new("Ana")).unwrap();

        let result = store.update(
            &patient.id,
            PatientPatch {
                name: Some("".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::InvalidDraft(_))));
        assert_eq!(store.get(&patient.id).unwrap().name, "Ana");
    }

    #[test]
    fn test_remove() {
        let mut store = setup_store();
        let a = store.add(PatientDraft::new("A")).unwrap();
        let b = store.add(PatientDraft::new("B")).unwrap();

        assert!(store.remove(&a.id).unwrap());
        assert_eq!(store.patients(), &[b]);
        assert_eq!(store.load(), store.patients().to_vec());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = setup_store();
        store.add(PatientDraft::new("A")).unwrap();
        let before = store.patients().to_vec();

        assert!(!store.remove("missing").unwrap());
        assert!(!store.remove("missing").unwrap());
        assert_eq!(store.patients(), before.as_slice());
        assert_eq!(store.load(), before);
    }

    #[test]
    fn test_touch_visit_today() {
        let mut store = setup_store();
        let patient = store
            .add(PatientDraft::new("Ana").with_last_visit(date("2024-01-15")))
            .unwrap();

        let touched = store.touch_visit_today(&patient.id, date("2024-03-01")).unwrap();
        assert_eq!(touched.last_visit, Some(date("2024-03-01")));

        assert!(matches!(
            store.touch_visit_today("missing", date("2024-03-01")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let mut store = setup_store();
        store
            .add(
                PatientDraft::new("Ana Ruiz")
                    .with_diagnosis("Hipertensión")
                    .with_first_visit(date("2023-05-02"))
                    .with_last_visit(date("2024-01-15")),
            )
            .unwrap();
        store.add(PatientDraft::new("Luis")).unwrap();
        store.persist().unwrap();

        let reopened = PatientStore::open(store.slot().clone());
        assert_eq!(reopened.patients(), store.patients());
    }

    #[test]
    fn test_blank_diagnosis_round_trip() {
        let mut store = setup_store();
        store.add(PatientDraft::new("Ana").with_diagnosis("")).unwrap();
        let luis = store.add(PatientDraft::new("Luis").with_diagnosis("Asma")).unwrap();
        store
            .update(
                &luis.id,
                PatientPatch {
                    diagnosis: Some(Some(" ".into())),
                    ..Default::default()
                },
            )
            .unwrap();

        let reopened = PatientStore::open(store.slot().clone());
        assert_eq!(reopened.patients(), store.patients());
        assert!(reopened.patients().iter().all(|p| p.diagnosis.is_none()));
    }

    #[test]
    fn test_with_config_rejects_invalid_config() {
        let blank_key = TrackerConfig {
            storage_key: "".into(),
            ..Default::default()
        };
        assert!(matches!(
            PatientStore::with_config(MemorySlot::new(), &blank_key),
            Err(ConfigError::Invalid { field: "storage_key", .. })
        ));
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut store = setup_store();
        store.slot_mut().set_fail_writes(true);

        let result = store.add(PatientDraft::new("Ana"));
        assert!(matches!(result, Err(StoreError::PersistenceUnavailable(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.patients()[0].name, "Ana");

        store.slot_mut().set_fail_writes(false);
        store.persist().unwrap();
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_custom_storage_key() {
        let config = TrackerConfig {
            storage_key: "clinica".into(),
            ..Default::default()
        };
        let mut store = PatientStore::with_config(MemorySlot::new(), &config).unwrap();
        store.add(PatientDraft::new("Ana")).unwrap();

        assert!(store.slot().raw("clinica").is_some());
        assert!(store.slot().raw("pacientes").is_none());
    }

    #[test]
    fn test_reload_discards_unsaved_state() {
        let mut store = setup_store();
        store.add(PatientDraft::new("Ana")).unwrap();
        store.slot_mut().set_fail_writes(true);
        let _ = store.add(PatientDraft::new("Luis"));
        assert_eq!(store.len(), 2);

        store.reload();
        assert_eq!(store.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_added_ids_are_unique(names in proptest::collection::vec("[A-Za-z]{1,8}", 1..30)) {
            let mut store = setup_store();
            for name in names {
                store.add(PatientDraft::new(name)).unwrap();
            }
            let ids: HashSet<_> = store.patients().iter().map(|p| p.id.clone()).collect();
            prop_assert_eq!(ids.len(), store.len());
        }
    }
}
