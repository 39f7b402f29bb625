//! Application wiring: collaborators plus the per-process writer lock.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::cards::CardStore;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::CoreResult;
use crate::logging::{self, FileLogGuard};
use crate::settings::SettingsStore;
use crate::stats::StatsStore;
use crate::storage::{JsonFileStore, KvStore};

pub struct App {
    storage: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    cards: CardStore,
    stats: StatsStore,
    settings: SettingsStore,
    // Serializes every read-modify-write against the storage records. The
    // original runtime processed one message at a time; this lock preserves
    // that single-writer behavior under a multi-threaded executor.
    write_lock: Mutex<()>,
    // Held so the rolling file writer survives as long as the app does.
    _log_guard: Option<FileLogGuard>,
}

impl App {
    pub fn new(storage: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cards: CardStore::new(storage.clone(), clock.clone()),
            stats: StatsStore::new(storage.clone(), clock.clone()),
            settings: SettingsStore::new(storage.clone()),
            storage,
            clock,
            write_lock: Mutex::new(()),
            _log_guard: None,
        }
    }

    /// File-backed app on the real clock, configured from the environment.
    /// Installs the tracing subscriber before the first storage access.
    pub async fn from_env() -> CoreResult<Self> {
        let config = Config::from_env();
        let log_guard = logging::init_tracing(&config.log_level);
        let storage = Arc::new(JsonFileStore::open(&config.data_path).await?);
        let mut app = Self::new(storage, Arc::new(SystemClock));
        app._log_guard = log_guard;
        Ok(app)
    }

    pub fn cards(&self) -> &CardStore {
        &self.cards
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn storage(&self) -> &dyn KvStore {
        self.storage.as_ref()
    }

    pub async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}
