//! Persisted user settings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::storage::{KvStore, SETTINGS_RECORD};

pub const MIN_NEW_CARDS_PER_DAY: i64 = 0;
pub const MAX_NEW_CARDS_PER_DAY: i64 = 100;
pub const DEFAULT_NEW_CARDS_PER_DAY: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub new_cards_per_day: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            new_cards_per_day: DEFAULT_NEW_CARDS_PER_DAY,
        }
    }
}

pub struct SettingsStore {
    storage: Arc<dyn KvStore>,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn KvStore>) -> Self {
        Self { storage }
    }

    pub async fn get(&self) -> CoreResult<Settings> {
        match self.storage.read_record(SETTINGS_RECORD).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| CoreError::Corrupt {
                record: SETTINGS_RECORD.to_string(),
                source: e,
            }),
            None => Ok(Settings::default()),
        }
    }

    /// Validates before any write; an out-of-range value leaves the stored
    /// settings untouched.
    pub async fn set_new_card_limit(&self, limit: i64) -> CoreResult<Settings> {
        if !(MIN_NEW_CARDS_PER_DAY..=MAX_NEW_CARDS_PER_DAY).contains(&limit) {
            return Err(CoreError::SettingOutOfRange {
                name: "newCardsPerDay",
                value: limit,
                min: MIN_NEW_CARDS_PER_DAY,
                max: MAX_NEW_CARDS_PER_DAY,
            });
        }
        let mut settings = self.get().await?;
        settings.new_cards_per_day = limit;
        self.storage
            .write_record(SETTINGS_RECORD, serde_json::to_value(&settings)?)
            .await?;
        Ok(settings)
    }
}
