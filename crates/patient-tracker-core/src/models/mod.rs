//! Domain models for the patient tracker.

mod patient;
mod schedule;

pub use patient::*;
pub use schedule::*;
