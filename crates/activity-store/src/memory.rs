//! In-memory backend (process lifetime only).

use activity_types::{ActivityBackend, ActivityRecord, StoreError};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds the persisted collection in memory. Useful for tests and for deployments that do
/// not need the log to survive a restart.
pub struct InMemoryBackend {
    records: Arc<RwLock<Vec<ActivityRecord>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Start from an existing collection (newest first).
    pub fn with_records(records: Vec<ActivityRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ActivityBackend for InMemoryBackend {
    async fn load(&self) -> Result<Vec<ActivityRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, records: &[ActivityRecord]) -> Result<(), StoreError> {
        *self.records.write().await = records.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_types::fixtures::record_at;
    use chrono::Utc;

    #[tokio::test]
    async fn save_overwrites_whole_collection() {
        let backend = InMemoryBackend::new();
        let now = Utc::now();
        backend
            .save(&[record_at("a", "u1", "inventory", now), record_at("b", "u1", "garage", now)])
            .await
            .unwrap();
        backend
            .save(&[record_at("c", "u2", "parts", now)])
            .await
            .unwrap();
        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "c");

        backend.clear().await.unwrap();
        assert!(backend.load().await.unwrap().is_empty());
    }
}
