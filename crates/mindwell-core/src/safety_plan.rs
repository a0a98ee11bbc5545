//! Personal safety plan: warning signs, coping strategies and people to
//! contact. A single record, overwritten wholesale on every save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::{keys, load_json, save_json, RecordStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafetyPlan {
    pub warning_signs: String,
    pub coping_strategies: String,
    pub support_contacts: String,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SafetyPlan {
    pub fn new(
        warning_signs: impl Into<String>,
        coping_strategies: impl Into<String>,
        support_contacts: impl Into<String>,
    ) -> Self {
        Self {
            warning_signs: warning_signs.into(),
            coping_strategies: coping_strategies.into(),
            support_contacts: support_contacts.into(),
            last_updated: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warning_signs.trim().is_empty()
            && self.coping_strategies.trim().is_empty()
            && self.support_contacts.trim().is_empty()
    }

    /// The stored plan, or an empty one.
    pub fn load(store: &dyn RecordStore) -> Result<Self, CoreError> {
        Ok(load_json(store, keys::SAFETY_PLAN)?.unwrap_or_default())
    }

    /// Stamp and overwrite the stored plan.
    pub fn save(&mut self, store: &dyn RecordStore) -> Result<(), CoreError> {
        self.last_updated = Some(Utc::now());
        save_json(store, keys::SAFETY_PLAN, self)
    }
}
