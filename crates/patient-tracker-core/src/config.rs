//! Tracker configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default key under which the patient list is stored.
pub const DEFAULT_STORAGE_KEY: &str = "pacientes";

/// Default months between a visit and the follow-up appointment.
pub const DEFAULT_FOLLOW_UP_MONTHS: u32 = 1;

/// Default window (in days) in which an appointment counts as due soon.
pub const DEFAULT_DUE_SOON_DAYS: i64 = 7;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Runtime settings for a tracker instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Key of the storage slot holding the serialized patient list
    pub storage_key: String,
    /// Months added to the last visit to get the next appointment
    pub follow_up_months: u32,
    /// Appointments this many days out or fewer are due soon
    pub due_soon_days: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.into(),
            follow_up_months: DEFAULT_FOLLOW_UP_MONTHS,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

impl TrackerConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage_key",
                reason: "must not be empty".into(),
            });
        }
        if self.follow_up_months == 0 {
            return Err(ConfigError::Invalid {
                field: "follow_up_months",
                reason: "must be at least 1".into(),
            });
        }
        if self.due_soon_days < 0 {
            return Err(ConfigError::Invalid {
                field: "due_soon_days",
                reason: format!("must not be negative, got {}", self.due_soon_days),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.storage_key, "pacientes");
        assert_eq!(config.follow_up_months, 1);
        assert_eq!(config.due_soon_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TrackerConfig::from_json_str(r#"{"due_soon_days": 3}"#).unwrap();
        assert_eq!(config.due_soon_days, 3);
        assert_eq!(config.storage_key, "pacientes");
        assert_eq!(config.follow_up_months, 1);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            TrackerConfig::from_json_str(r#"{"follow_up_months": 0}"#),
            Err(ConfigError::Invalid { field: "follow_up_months", .. })
        ));
        assert!(matches!(
            TrackerConfig::from_json_str(r#"{"due_soon_days": -1}"#),
            Err(ConfigError::Invalid { field: "due_soon_days", .. })
        ));
        assert!(matches!(
            TrackerConfig::from_json_str(r#"{"storage_key": ""}"#),
            Err(ConfigError::Invalid { field: "storage_key", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            TrackerConfig::from_json_str("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
