//! Single-file JSON store.
//!
//! All records live in one JSON object on disk, loaded at open and rewritten
//! on every mutation. Fits the data volume here (hundreds of cards); a
//! different backend can replace it behind [`KvStore`] without touching the
//! core.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::storage::KvStore;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<HashMap<String, Value>>,
}

impl JsonFileStore {
    pub async fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| CoreError::Corrupt {
                record: path.display().to_string(),
                source: e,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(io_error(&path, e)),
        };
        debug!(path = %path.display(), "opened json store");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    async fn flush(&self, records: &HashMap<String, Value>) -> CoreResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        // Write-then-rename so a crash mid-write cannot truncate the live file.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> CoreError {
    CoreError::Storage {
        record: path.display().to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl KvStore for JsonFileStore {
    async fn read_record(&self, record: &str) -> CoreResult<Option<Value>> {
        Ok(self.records.read().await.get(record).cloned())
    }

    async fn write_record(&self, record: &str, value: Value) -> CoreResult<()> {
        let mut records = self.records.write().await;
        records.insert(record.to_string(), value);
        self.flush(&records).await
    }

    async fn clear(&self) -> CoreResult<()> {
        let mut records = self.records.write().await;
        records.clear();
        self.flush(&records).await
    }
}
