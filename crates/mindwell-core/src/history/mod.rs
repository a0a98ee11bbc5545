//! Mood and meditation history.
//!
//! [`History`] owns the append-only mood and session logs plus the running
//! meditation totals, and produces the chart series and listings the front
//! end shows. Each collection persists under its own record-store key.

mod mood;
mod sessions;

pub use mood::{
    windowed_average, DailyAverage, MoodEntry, MoodScore, MoodSummary, MAX_WINDOW_DAYS,
};
pub use sessions::{MeditationRecord, MeditationStats};

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;

use crate::error::{CoreError, StorageError};
use crate::storage::{keys, load_json, save_json, RecordStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    moods: Vec<MoodEntry>,
    sessions: Vec<MeditationRecord>,
    stats: MeditationStats,
    /// Keys that could not be read and whose raw value is still in place.
    protected: BTreeSet<&'static str>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all three collections; missing keys start empty. Fails if any
    /// key is unreadable.
    pub fn load(store: &dyn RecordStore) -> Result<Self, CoreError> {
        Ok(Self {
            moods: load_json(store, keys::MOOD_DATA)?.unwrap_or_default(),
            sessions: load_json(store, keys::MEDITATION_HISTORY)?.unwrap_or_default(),
            stats: load_json(store, keys::MEDITATION_STATS)?.unwrap_or_default(),
            protected: BTreeSet::new(),
        })
    }

    /// Load each collection on its own. An unreadable key starts empty
    /// and its raw value is copied to a quarantine key; if that copy
    /// fails the key is protected and later saves to it are refused.
    /// Returns the history and one error per unreadable key.
    pub fn recover(store: &dyn RecordStore) -> (Self, Vec<CoreError>) {
        let mut history = Self::new();
        let mut problems = Vec::new();
        history.moods = history.load_key(store, keys::MOOD_DATA, &mut problems);
        history.sessions = history.load_key(store, keys::MEDITATION_HISTORY, &mut problems);
        history.stats = history.load_key(store, keys::MEDITATION_STATS, &mut problems);
        (history, problems)
    }

    fn load_key<T: DeserializeOwned + Default>(
        &mut self,
        store: &dyn RecordStore,
        key: &'static str,
        problems: &mut Vec<CoreError>,
    ) -> T {
        match load_json(store, key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                if let Err(backup) = quarantine(store, key) {
                    tracing::warn!(key, error = %backup, "unreadable record kept in place");
                    self.protected.insert(key);
                }
                problems.push(e);
                T::default()
            }
        }
    }

    /// Keys that will not be written because their old value survives
    /// only in place.
    pub fn protected_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.protected.iter().copied()
    }

    fn guard(&self, key: &'static str) -> Result<(), CoreError> {
        if self.protected.contains(key) {
            return Err(StorageError::Protected {
                key: key.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn save_moods(&self, store: &dyn RecordStore) -> Result<(), CoreError> {
        self.guard(keys::MOOD_DATA)?;
        save_json(store, keys::MOOD_DATA, &self.moods)
    }

    pub fn save_stats(&self, store: &dyn RecordStore) -> Result<(), CoreError> {
        self.guard(keys::MEDITATION_STATS)?;
        save_json(store, keys::MEDITATION_STATS, &self.stats)
    }

    pub fn save_sessions(&self, store: &dyn RecordStore) -> Result<(), CoreError> {
        self.guard(keys::MEDITATION_HISTORY)?;
        save_json(store, keys::MEDITATION_HISTORY, &self.sessions)
    }

    pub fn moods(&self) -> &[MoodEntry] {
        &self.moods
    }

    pub fn sessions(&self) -> &[MeditationRecord] {
        &self.sessions
    }

    pub fn stats(&self) -> MeditationStats {
        self.stats
    }

    pub fn record_mood(&mut self, entry: MoodEntry) {
        tracing::debug!(mood = entry.mood.value(), "mood recorded");
        self.moods.push(entry);
    }

    /// Append a completed session and credit it to the totals.
    pub fn record_session(&mut self, record: MeditationRecord) {
        self.stats.credit(&record);
        tracing::info!(
            session_type = %record.session_type,
            minutes = record.minutes,
            total_sessions = self.stats.total_sessions,
            "meditation recorded"
        );
        self.sessions.push(record);
    }

    /// Daily mood averages for the last `days` days ending today (UTC).
    pub fn windowed_average(&self, days: u32) -> Vec<DailyAverage> {
        self.windowed_average_on(days, Utc::now().date_naive())
    }

    pub fn windowed_average_on(&self, days: u32, today: NaiveDate) -> Vec<DailyAverage> {
        windowed_average(&self.moods, days, today)
    }

    /// Newest first by timestamp; equal timestamps keep the later entry
    /// first.
    pub fn recent_moods(&self, n: usize) -> Vec<&MoodEntry> {
        let mut entries: Vec<&MoodEntry> = self.moods.iter().rev().collect();
        entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        entries.truncate(n);
        entries
    }

    /// Newest first by timestamp.
    pub fn recent_sessions(&self, n: usize) -> Vec<&MeditationRecord> {
        let mut records: Vec<&MeditationRecord> = self.sessions.iter().rev().collect();
        records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        records.truncate(n);
        records
    }

    pub fn mood_summary(&self, days: u32) -> MoodSummary {
        self.mood_summary_on(days, Utc::now().date_naive())
    }

    pub fn mood_summary_on(&self, days: u32, today: NaiveDate) -> MoodSummary {
        let averages: Vec<f64> = self
            .windowed_average_on(days, today)
            .into_iter()
            .filter_map(|d| d.average)
            .collect();
        let average = if averages.is_empty() {
            None
        } else {
            Some(averages.iter().sum::<f64>() / averages.len() as f64)
        };
        MoodSummary {
            entries: self.moods.len(),
            average,
        }
    }
}

/// Copy the raw value of `key` aside so it survives the next save.
fn quarantine(store: &dyn RecordStore, key: &str) -> Result<(), StorageError> {
    if let Some(raw) = store.get(key)? {
        let aside = keys::quarantine(key, Utc::now().timestamp_millis());
        store.set(&aside, &raw)?;
        tracing::warn!(key, aside = %aside, "unreadable record moved aside");
    }
    Ok(())
}
