//! Patient search.

use crate::models::Patient;

/// Case-insensitive substring filter over name and diagnosis.
///
/// An empty term matches every patient. Input order is preserved.
pub fn filter<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    let term = term.to_lowercase();
    patients
        .iter()
        .filter(|patient| matches(patient, &term))
        .collect()
}

/// Check a patient against an already lower-cased term.
pub fn matches(patient: &Patient, lower_term: &str) -> bool {
    if lower_term.is_empty() {
        return true;
    }
    patient.name.to_lowercase().contains(lower_term)
        || patient
            .diagnosis
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(lower_term))
}
