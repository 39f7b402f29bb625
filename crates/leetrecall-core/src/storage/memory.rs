//! In-memory store, used by tests and as a scratch backend.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::storage::KvStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn read_record(&self, record: &str) -> CoreResult<Option<Value>> {
        Ok(self.records.read().await.get(record).cloned())
    }

    async fn write_record(&self, record: &str, value: Value) -> CoreResult<()> {
        self.records.write().await.insert(record.to_string(), value);
        Ok(())
    }

    async fn clear(&self) -> CoreResult<()> {
        self.records.write().await.clear();
        Ok(())
    }
}
