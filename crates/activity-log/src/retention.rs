//! Periodic retention: prune records past a maximum age on a fixed interval.

use crate::ActivityLog;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    pub max_age_days: u32,
    pub interval: Duration,
}

/// Spawn a worker that prunes `log` every `policy.interval`, starting immediately.
/// Storage errors are logged and retried on the next tick.
pub fn spawn_retention(log: Arc<ActivityLog>, policy: RetentionPolicy) -> JoinHandle<()> {
    let period = policy.interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match log.prune_older_than(policy.max_age_days).await {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::debug!(removed, max_age_days = policy.max_age_days, "retention pass")
                }
                Err(e) => tracing::warn!(error = %e, "retention pass failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogChange, LogConfig};
    use activity_store::InMemoryBackend;
    use activity_types::fixtures::record_at;
    use chrono::Utc;

    #[tokio::test]
    async fn first_tick_prunes_stale_records() {
        let now = Utc::now();
        let backend = Arc::new(InMemoryBackend::with_records(vec![
            record_at("fresh", "alice", "inventory", now),
            record_at("stale", "alice", "inventory", now - chrono::Duration::days(90)),
        ]));
        let log = Arc::new(ActivityLog::open(backend, LogConfig::default()).await);
        let mut changes = log.subscribe();

        let handle = spawn_retention(
            Arc::clone(&log),
            RetentionPolicy {
                max_age_days: 30,
                interval: Duration::from_secs(3600),
            },
        );
        let change = tokio::time::timeout(Duration::from_secs(5), changes.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change, LogChange::Pruned { removed: 1 });
        assert_eq!(log.len().await, 1);
        handle.abort();
    }
}
