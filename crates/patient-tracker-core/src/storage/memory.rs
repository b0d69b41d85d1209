//! In-memory slot.

use std::collections::HashMap;

use super::{KeyValueSlot, StorageError, StorageResult};

/// Slot backed by a `HashMap`. Used for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemorySlot {
    values: HashMap<String, String>,
    fail_writes: bool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-populated with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut slot = Self::new();
        slot.values.insert(key.to_string(), value.to_string());
        slot
    }

    /// Make every subsequent write fail, as a full storage quota would.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw stored value, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueSlot for MemorySlot {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("storage quota exceeded".into()));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
