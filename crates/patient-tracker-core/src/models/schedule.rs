//! Derived scheduling models. Never stored, recomputed on every read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patient::Patient;

/// How pressing the next appointment is, relative to today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum Urgency {
    /// No last visit, so nothing to schedule
    Unscheduled,
    /// Appointment date has passed by this many days
    Overdue(i64),
    /// Appointment is today
    DueToday,
    /// Appointment falls within the due-soon window, in this many days
    DueSoon(i64),
    /// Appointment is further out than the due-soon window
    Scheduled,
}

impl Urgency {
    /// Day count carried by the variant, if any.
    pub fn days(&self) -> Option<i64> {
        match self {
            Urgency::Overdue(days) | Urgency::DueSoon(days) => Some(*days),
            _ => None,
        }
    }
}

/// Next appointment date together with its urgency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    pub next_date: Option<NaiveDate>,
    pub urgency: Urgency,
}

/// A patient annotated with its schedule status, as rendered by a UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientWithStatus {
    pub patient: Patient,
    pub status: ScheduleStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_days() {
        assert_eq!(Urgency::Overdue(3).days(), Some(3));
        assert_eq!(Urgency::DueSoon(5).days(), Some(5));
        assert_eq!(Urgency::DueToday.days(), None);
        assert_eq!(Urgency::Scheduled.days(), None);
    }

    #[test]
    fn test_urgency_serialization() {
        let json = serde_json::to_string(&Urgency::DueSoon(5)).unwrap();
        assert_eq!(json, r#"{"kind":"due_soon","days":5}"#);

        let json = serde_json::to_string(&Urgency::DueToday).unwrap();
        assert_eq!(json, r#"{"kind":"due_today"}"#);
    }
}
