//! Entry point for presentation layers.
//!
//! Pipeline for reads: Store → Filter → Schedule → UI

use chrono::NaiveDate;

use crate::config::{ConfigError, TrackerConfig};
use crate::models::{Patient, PatientDraft, PatientPatch, PatientWithStatus};
use crate::query;
use crate::schedule::Schedule;
use crate::storage::KeyValueSlot;
use crate::store::{PatientStore, StoreResult};

/// Source of the current calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Coordinates the store, the search filter and the schedule rules.
pub struct PatientService<S: KeyValueSlot> {
    store: PatientStore<S>,
    schedule: Schedule,
    clock: Box<dyn Clock + Send>,
}

impl<S: KeyValueSlot> PatientService<S> {
    /// Create a service with default configuration and the system clock.
    pub fn new(slot: S) -> Self {
        Self {
            store: PatientStore::open(slot),
            schedule: Schedule::default(),
            clock: Box::new(SystemClock),
        }
    }

    /// Create a service from a configuration, which is validated before the
    /// slot is read.
    pub fn with_config(
        slot: S,
        config: &TrackerConfig,
        clock: Box<dyn Clock + Send>,
    ) -> Result<Self, ConfigError> {
        let schedule = Schedule::from_config(config)?;
        Ok(Self {
            store: PatientStore::with_config(slot, config)?,
            schedule,
            clock,
        })
    }

    /// Patients matching `term`, each with its schedule status as of `today`.
    pub fn list_with_status(&self, term: &str, today: NaiveDate) -> Vec<PatientWithStatus> {
        let matched = query::filter(self.store.patients(), term);
        tracing::debug!(
            total = self.store.len(),
            matched = matched.len(),
            "Listing patients"
        );

        matched
            .into_iter()
            .map(|patient| PatientWithStatus {
                status: self.schedule.status(patient.last_visit, today),
                patient: patient.clone(),
            })
            .collect()
    }

    /// Same as [`list_with_status`](Self::list_with_status) using the clock's date.
    pub fn list_with_status_now(&self, term: &str) -> Vec<PatientWithStatus> {
        self.list_with_status(term, self.clock.today())
    }

    /// Get a patient by ID (e.g. to prefill an edit form).
    pub fn get_patient(&self, id: &str) -> Option<&Patient> {
        self.store.get(id)
    }

    pub fn create_patient(&mut self, draft: PatientDraft) -> StoreResult<Patient> {
        self.store.add(draft)
    }

    pub fn edit_patient(&mut self, id: &str, patch: PatientPatch) -> StoreResult<Patient> {
        self.store.update(id, patch)
    }

    pub fn delete_patient(&mut self, id: &str) -> StoreResult<bool> {
        self.store.remove(id)
    }

    /// Record a visit today.
    pub fn mark_visited_today(&mut self, id: &str) -> StoreResult<Patient> {
        let today = self.clock.today();
        self.store.touch_visit_today(id, today)
    }

    pub fn store(&self) -> &PatientStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PatientStore<S> {
        &mut self.store
    }
}
