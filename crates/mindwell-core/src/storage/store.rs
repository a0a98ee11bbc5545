//! String-keyed record store.
//!
//! Values are JSON documents. Keys are independent: there is no
//! transaction spanning several keys, and the last write wins.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, StorageError};

/// Keys used by the application.
pub mod keys {
    pub const MOOD_DATA: &str = "mindwell_mood_data";
    pub const MEDITATION_STATS: &str = "mindwell_meditation_stats";
    pub const MEDITATION_HISTORY: &str = "mindwell_meditation_history";
    pub const SAFETY_PLAN: &str = "mindwell_safety_plan";
    pub const DAILY_TIP: &str = "mindwell_daily_tip";
    pub const DAILY_TIP_DATE: &str = "mindwell_daily_tip_date";

    pub const AUTH_SESSION: &str = "mindwell_auth_session";

    /// Profile record for a user id.
    pub fn user_profile(uid: &str) -> String {
        format!("users/{uid}")
    }

    /// Where an undecodable value of `key` is moved before it is replaced.
    pub fn quarantine(key: &str, stamp_ms: i64) -> String {
        format!("{key}.unreadable.{stamp_ms}")
    }
}

pub trait RecordStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read and decode `key`, or `None` if absent.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn RecordStore,
    key: &str,
) -> Result<Option<T>, CoreError> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| {
                StorageError::Corrupt {
                    key: key.to_string(),
                    message: e.to_string(),
                }
                .into()
            }),
        None => Ok(None),
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn RecordStore,
    key: &str,
    value: &T,
) -> Result<(), CoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    Ok(())
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match self.values.lock() {
            Ok(values) => values.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        keys.sort();
        keys
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::Locked)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Locked)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
