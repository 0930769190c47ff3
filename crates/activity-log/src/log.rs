//! ActivityLog: the bounded, newest-first event store and its single writer.

use crate::{aggregate, classify, query};
use activity_store::ActivityBackend;
use activity_types::{
    ActivityDraft, ActivityRecord, ActivityStats, Actor, DailyCount, EmployeeSummary,
    FilterCriteria, RecordMetadata, StoreError,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Maximum number of records kept unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 10_000;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Ring-buffer cap; the oldest records are dropped once it is exceeded.
    pub capacity: usize,
    /// Restore persisted records on open. When false the persisted collection is cleared
    /// and every run starts empty.
    pub restore_on_start: bool,
    /// Session id stamped on records whose caller supplies none. Generated when unset.
    pub session_id: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            restore_on_start: true,
            session_id: None,
        }
    }
}

/// Notification sent to subscribers after each committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum LogChange {
    Recorded(ActivityRecord),
    Pruned { removed: usize },
    Cleared,
}

#[derive(Debug, thiserror::Error)]
pub enum ActivityLogError {
    #[error("activity store: {0}")]
    Store(#[from] StoreError),
}

/// Authoritative in-memory activity collection, kept in sync with a persistence backend.
///
/// Writers are serialized by the collection lock and every mutation persists the new
/// state before it becomes visible, so memory never runs ahead of storage. Processes
/// sharing one backend are not coordinated: the last full write wins.
pub struct ActivityLog {
    backend: Arc<dyn ActivityBackend>,
    /// Newest first, never longer than `capacity`.
    records: RwLock<Vec<ActivityRecord>>,
    capacity: usize,
    session_id: String,
    changes: broadcast::Sender<LogChange>,
}

impl ActivityLog {
    /// Open the log over `backend`. Load failures are logged and the log starts empty.
    pub async fn open(backend: Arc<dyn ActivityBackend>, config: LogConfig) -> Self {
        let capacity = config.capacity.max(1);
        let session_id = config
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let records = if config.restore_on_start {
            match backend.load().await {
                Ok(mut records) => {
                    records.truncate(capacity);
                    records
                }
                Err(e) => {
                    tracing::warn!(
                        backend = %backend.describe(),
                        error = %e,
                        "failed to load activity log; starting empty"
                    );
                    Vec::new()
                }
            }
        } else {
            if let Err(e) = backend.clear().await {
                tracing::warn!(backend = %backend.describe(), error = %e, "failed to clear activity log");
            }
            Vec::new()
        };
        tracing::info!(
            backend = %backend.describe(),
            restored = records.len(),
            capacity,
            "activity log opened"
        );

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            backend,
            records: RwLock::new(records),
            capacity,
            session_id,
            changes,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Receive a [`LogChange`] after every committed mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<LogChange> {
        self.changes.subscribe()
    }

    fn new_record_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", now.timestamp_millis(), &suffix[..9])
    }

    fn build(&self, actor: &Actor, draft: ActivityDraft, now: DateTime<Utc>) -> ActivityRecord {
        let ActivityDraft {
            action,
            section,
            entity_type,
            details,
            options,
            context,
        } = draft;
        let user_agent = context.user_agent.unwrap_or_default();
        let metadata = RecordMetadata {
            device_type: classify::device_type(&user_agent),
            browser_name: classify::browser_name(&user_agent).to_string(),
            session_id: context
                .session_id
                .unwrap_or_else(|| self.session_id.clone()),
            page_url: context.page_url.unwrap_or_default(),
            user_agent,
        };
        ActivityRecord {
            id: Self::new_record_id(now),
            timestamp: now,
            user_id: actor.user_id.clone(),
            user_name: actor.user_name.clone(),
            user_role: actor.user_role.clone(),
            action,
            section,
            entity_type,
            entity_id: options.entity_id,
            entity_name: options.entity_name,
            details,
            vin_number: options.vin_number,
            part_number: options.part_number,
            car_model: options.car_model,
            car_brand: options.car_brand,
            category: options.category,
            location: options.location,
            changes: options.changes,
            metadata,
        }
    }

    /// Record one activity for `actor`.
    ///
    /// Without an actor nothing is stored and `Ok(None)` is returned. On a storage error the
    /// in-memory collection is left as it was.
    pub async fn record(
        &self,
        actor: Option<&Actor>,
        draft: ActivityDraft,
    ) -> Result<Option<ActivityRecord>, ActivityLogError> {
        let Some(actor) = actor else {
            tracing::debug!(section = %draft.section, action = %draft.action, "no acting user; activity dropped");
            return Ok(None);
        };
        let record = self.build(actor, draft, Utc::now());

        let mut guard = self.records.write().await;
        let mut next = Vec::with_capacity((guard.len() + 1).min(self.capacity));
        next.push(record.clone());
        next.extend(guard.iter().take(self.capacity - 1).cloned());
        if let Err(e) = self.backend.append(&record, &next).await {
            tracing::warn!(backend = %self.backend.describe(), error = %e, "failed to persist activity");
            return Err(e.into());
        }
        *guard = next;
        drop(guard);

        let _ = self.changes.send(LogChange::Recorded(record.clone()));
        Ok(Some(record))
    }

    /// Remove every record older than `days` days and persist the result.
    /// Returns how many records were removed.
    pub async fn prune_older_than(&self, days: u32) -> Result<usize, ActivityLogError> {
        let now = Utc::now();
        let cutoff = now
            .checked_sub_signed(chrono::Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut guard = self.records.write().await;
        let next: Vec<ActivityRecord> = guard
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .cloned()
            .collect();
        let removed = guard.len() - next.len();
        if removed == 0 {
            return Ok(0);
        }
        self.backend.save(&next).await?;
        *guard = next;
        drop(guard);

        tracing::info!(removed, days, "pruned activity log");
        let _ = self.changes.send(LogChange::Pruned { removed });
        Ok(removed)
    }

    /// Drop every record, in memory and in storage.
    pub async fn clear(&self) -> Result<(), ActivityLogError> {
        let mut guard = self.records.write().await;
        self.backend.clear().await?;
        guard.clear();
        drop(guard);
        let _ = self.changes.send(LogChange::Cleared);
        Ok(())
    }

    /// Copy of the collection, newest first.
    pub async fn snapshot(&self) -> Vec<ActivityRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn filter(&self, criteria: &FilterCriteria) -> Vec<ActivityRecord> {
        query::filter(&self.records.read().await, criteria)
    }

    pub async fn advanced_search(&self, query_text: &str) -> Vec<ActivityRecord> {
        query::advanced_search(&self.records.read().await, query_text)
    }

    pub async fn stats(&self) -> ActivityStats {
        aggregate::stats_at(&self.records.read().await, Utc::now())
    }

    pub async fn daily_counts(&self, days: u32) -> Vec<DailyCount> {
        aggregate::daily_counts_at(&self.records.read().await, days, Utc::now())
    }

    pub async fn employee_summary(&self, user_id: &str) -> Option<EmployeeSummary> {
        aggregate::employee_summary_at(&self.records.read().await, user_id, Utc::now())
    }

    pub async fn all_employees_summary(&self) -> Vec<EmployeeSummary> {
        aggregate::all_employees_summary_at(&self.records.read().await, Utc::now())
    }
}
