//! Display helpers for presentation layers.
//!
//! Labels are in Spanish, matching the clinic UI this core serves.

use chrono::{Locale, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Patient, Urgency};

/// Visual severity of a schedule status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    /// Nothing scheduled
    Neutral,
    /// Overdue
    Danger,
    /// Due today or soon
    Warning,
    /// Comfortably in the future
    Ok,
}

impl From<Urgency> for StatusTone {
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Unscheduled => StatusTone::Neutral,
            Urgency::Overdue(_) => StatusTone::Danger,
            Urgency::DueToday | Urgency::DueSoon(_) => StatusTone::Warning,
            Urgency::Scheduled => StatusTone::Ok,
        }
    }
}

impl StatusTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTone::Neutral => "neutral",
            StatusTone::Danger => "danger",
            StatusTone::Warning => "warning",
            StatusTone::Ok => "ok",
        }
    }
}

/// Short badge text for an urgency.
pub fn status_label(urgency: &Urgency) -> String {
    match urgency {
        Urgency::Unscheduled => "Sin programar".into(),
        Urgency::Overdue(days) => format!("Atrasada por {} días", days),
        Urgency::DueToday => "Es hoy".into(),
        Urgency::DueSoon(days) => format!("En {} días", days),
        Urgency::Scheduled => "Programada".into(),
    }
}

/// Long Spanish date, e.g. "15 de enero de 2024". Absent dates read "Sin fecha".
pub fn format_long_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d
            .format_localized("%-d de %B de %Y", Locale::es_ES)
            .to_string(),
        None => "Sin fecha".into(),
    }
}

pub fn diagnosis_label(patient: &Patient) -> &str {
    patient.diagnosis.as_deref().unwrap_or("Sin diagnóstico")
}
