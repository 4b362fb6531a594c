// Durable storage backends for the selection store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::db::Database;

/// A single-key text store. The selection store reads its key once at
/// startup and writes it after every mutation.
pub trait SelectionStorage: Send {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

impl SelectionStorage for Database {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.load_state(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.save_state(key, value)
    }
}

// Shared handles let a caller keep inspecting the backend after handing it
// to the store.
impl<T: SelectionStorage + Sync> SelectionStorage for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}

/// In-process storage, used when no database is wanted (tests, dry runs).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .slots
            .lock()
            .map(|mut slots| slots.insert(key.to_string(), value.to_string()))
            .ok();
        storage
    }

    /// Current raw value under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().ok()?.get(key).cloned()
    }
}

impl SelectionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("memory storage lock poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("memory storage lock poisoned"))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trips_value() {
        let storage = MemoryStorage::new();
        assert!(storage.read("k").unwrap().is_none());
        storage.write("k", "v").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
        assert_eq!(storage.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn memory_storage_with_value_is_prefilled() {
        let storage = MemoryStorage::with_value("k", "[]");
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn database_implements_selection_storage() {
        let db = Database::open(":memory:").unwrap();
        let storage: &dyn SelectionStorage = &db;
        storage.write("selectedProducts", "[]").unwrap();
        assert_eq!(
            storage.read("selectedProducts").unwrap().as_deref(),
            Some("[]")
        );
    }
}
