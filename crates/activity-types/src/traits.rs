//! Persistence backend trait for the activity log.

use crate::ActivityRecord;
use async_trait::async_trait;

/// Storage for the single persisted activity collection.
///
/// Records are exchanged newest-first. A backend owns exactly one collection; there is no
/// per-record addressing.
#[async_trait]
pub trait ActivityBackend: Send + Sync {
    /// Load the persisted collection, newest first. A missing collection is empty, not an error.
    async fn load(&self) -> Result<Vec<ActivityRecord>, StoreError>;

    /// Replace the persisted collection with `records`.
    async fn save(&self, records: &[ActivityRecord]) -> Result<(), StoreError>;

    /// Persist after `record` was prepended; `snapshot` is the full collection including it.
    async fn append(
        &self,
        record: &ActivityRecord,
        snapshot: &[ActivityRecord],
    ) -> Result<(), StoreError> {
        let _ = record;
        self.save(snapshot).await
    }

    /// Drop everything persisted.
    async fn clear(&self) -> Result<(), StoreError> {
        self.save(&[]).await
    }

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("corrupt store: {0}")]
    Corrupt(String),
    #[error("activity store error: {0}")]
    Other(String),
}
