//! Key-value persistence collaborator.
//!
//! The core keeps four records: all cards keyed by slug, all daily counters
//! keyed by date, the settings blob, and the note texts. Each record is one
//! JSON value read and written whole, matching extension-style local storage.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreResult;

pub const CARDS_RECORD: &str = "cards";
pub const REVIEW_DAYS_RECORD: &str = "review_days";
pub const SETTINGS_RECORD: &str = "settings";
pub const NOTES_RECORD: &str = "notes";

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn read_record(&self, record: &str) -> CoreResult<Option<Value>>;

    async fn write_record(&self, record: &str, value: Value) -> CoreResult<()>;

    /// Full data reset: drops every record.
    async fn clear(&self) -> CoreResult<()>;
}
