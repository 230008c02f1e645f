//! Durable counters.
//!
//! Only the cumulative step count and the sensitivity survive a restart. The
//! backing key-value store is injected; every backend stores plain strings so
//! that a value written by one backend reads the same through another.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use anyhow::Result;
use log::warn;

mod json_file;
mod migrations;
mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

pub const STEPS_KEY: &str = "steps";
pub const SENSITIVITY_KEY: &str = "sensitivity";

/// A string key-value backend.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: RwLock::new(data),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistedCounters {
    pub steps: u64,
    pub sensitivity: f64,
}

/// Best-effort persistence of the tracker counters.
///
/// Reads fall back to defaults and writes never fail the caller: a broken or
/// full backend only costs durability, never the in-memory update.
#[derive(Clone)]
pub struct PersistenceStore {
    backend: Arc<dyn KeyValueStore>,
    default_sensitivity: f64,
}

impl PersistenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, default_sensitivity: f64) -> Self {
        Self {
            backend,
            default_sensitivity,
        }
    }

    pub fn load(&self) -> PersistedCounters {
        let steps = self
            .read(STEPS_KEY)
            .and_then(|raw| parse_steps(&raw))
            .unwrap_or(0);
        let sensitivity = self
            .read(SENSITIVITY_KEY)
            .and_then(|raw| parse_sensitivity(&raw))
            .unwrap_or(self.default_sensitivity);

        PersistedCounters { steps, sensitivity }
    }

    pub fn save_steps(&self, steps: u64) {
        self.write(STEPS_KEY, &steps.to_string());
    }

    pub fn save_sensitivity(&self, sensitivity: f64) {
        self.write(SENSITIVITY_KEY, &sensitivity.to_string());
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!("Failed to read '{key}' from store, using default: {err:#}");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.backend.set(key, value) {
            warn!("Failed to persist '{key}'={value}: {err:#}");
        }
    }
}

fn parse_steps(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

fn parse_sensitivity(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}
