//! Appointment scheduling arithmetic.
//!
//! The next appointment is the last visit plus a number of calendar months.
//! When the target month is shorter than the visit's day of month, the date is
//! clamped to the last day of the target month (Jan 31 → Feb 28/29), never
//! rolled over into the month after.

use chrono::{Months, NaiveDate};

use crate::config::{ConfigError, TrackerConfig, DEFAULT_DUE_SOON_DAYS, DEFAULT_FOLLOW_UP_MONTHS};
use crate::models::{ScheduleStatus, Urgency};

/// Add calendar months, clamping the day to the end of the target month.
///
/// Returns `None` only when the result is outside chrono's date range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Next appointment one month after the last visit.
pub fn next_appointment(last_visit: Option<NaiveDate>) -> Option<NaiveDate> {
    Schedule::default().next_appointment(last_visit)
}

/// Classify an appointment date against today using the default window.
pub fn classify(next_date: Option<NaiveDate>, today: NaiveDate) -> Urgency {
    Schedule::default().classify(next_date, today)
}

/// Next appointment and urgency for a last-visit date.
pub fn schedule_status(last_visit: Option<NaiveDate>, today: NaiveDate) -> ScheduleStatus {
    Schedule::default().status(last_visit, today)
}

/// Scheduling rules with configurable interval and due-soon window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    follow_up_months: u32,
    due_soon_days: i64,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            follow_up_months: DEFAULT_FOLLOW_UP_MONTHS,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

impl Schedule {
    /// Build from a configuration, rejecting invalid intervals.
    pub fn from_config(config: &TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            follow_up_months: config.follow_up_months,
            due_soon_days: config.due_soon_days,
        })
    }

    /// Next appointment date, or `None` when there is no last visit.
    pub fn next_appointment(&self, last_visit: Option<NaiveDate>) -> Option<NaiveDate> {
        last_visit.and_then(|date| add_months(date, self.follow_up_months))
    }

    /// Classify by whole calendar days between today and the appointment.
    pub fn classify(&self, next_date: Option<NaiveDate>, today: NaiveDate) -> Urgency {
        let Some(next) = next_date else {
            return Urgency::Unscheduled;
        };

        let diff_days = next.signed_duration_since(today).num_days();
        if diff_days < 0 {
            Urgency::Overdue(diff_days.abs())
        } else if diff_days == 0 {
            Urgency::DueToday
        } else if diff_days <= self.due_soon_days {
            Urgency::DueSoon(diff_days)
        } else {
            Urgency::Scheduled
        }
    }

    pub fn status(&self, last_visit: Option<NaiveDate>, today: NaiveDate) -> ScheduleStatus {
        let next_date = self.next_appointment(last_visit);
        ScheduleStatus {
            next_date,
            urgency: self.classify(next_date, today),
        }
    }
}
