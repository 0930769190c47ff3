//! JSONL append-log backend with compaction.

use activity_types::{ActivityBackend, ActivityRecord, StoreError};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Append-only JSON-lines file. Lines are stored oldest-first; each append writes one line.
///
/// The log drops its oldest records in memory once it reaches capacity, but the file keeps
/// them until the line count passes `capacity + compaction_slack`. At that point the file
/// is rewritten from the in-memory snapshot.
pub struct JsonlBackend {
    path: PathBuf,
    capacity: usize,
    compaction_slack: usize,
    /// Lines currently in the file. Held for the whole append/compact sequence.
    lines: tokio::sync::Mutex<usize>,
}

impl JsonlBackend {
    pub fn new(path: impl AsRef<Path>, capacity: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            capacity,
            compaction_slack: (capacity / 4).max(1),
            lines: tokio::sync::Mutex::new(0),
        }
    }

    pub fn with_compaction_slack(mut self, slack: usize) -> Self {
        self.compaction_slack = slack.max(1);
        self
    }

    async fn rewrite(&self, records: &[ActivityRecord]) -> Result<(), StoreError> {
        let mut body = Vec::new();
        for record in records.iter().rev() {
            serde_json::to_writer(&mut body, record)?;
            body.push(b'\n');
        }
        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);
        let mut f = tokio::fs::File::create(&tmp).await?;
        f.write_all(&body).await?;
        f.sync_all().await?;
        drop(f);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivityBackend for JsonlBackend {
    async fn load(&self) -> Result<Vec<ActivityRecord>, StoreError> {
        let mut lines = self.lines.lock().await;
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                *lines = 0;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let mut out: Vec<ActivityRecord> = Vec::new();
        let mut count = 0usize;
        let mut skipped = 0usize;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            count += 1;
            match serde_json::from_str(line) {
                Ok(record) => out.push(record),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::warn!(path = %self.path.display(), skipped, "skipped unreadable activity lines");
        }
        *lines = count;
        out.reverse();
        out.truncate(self.capacity);
        Ok(out)
    }

    async fn save(&self, records: &[ActivityRecord]) -> Result<(), StoreError> {
        let mut lines = self.lines.lock().await;
        self.rewrite(records).await?;
        *lines = records.len();
        Ok(())
    }

    async fn append(
        &self,
        record: &ActivityRecord,
        snapshot: &[ActivityRecord],
    ) -> Result<(), StoreError> {
        let mut lines = self.lines.lock().await;
        if *lines + 1 > self.capacity + self.compaction_slack {
            self.rewrite(snapshot).await?;
            tracing::debug!(
                path = %self.path.display(),
                dropped = (*lines + 1).saturating_sub(snapshot.len()),
                "compacted activity log"
            );
            *lines = snapshot.len();
            return Ok(());
        }
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        f.write_all(&line).await?;
        *lines += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_types::fixtures::record_at;
    use chrono::{Duration, Utc};

    fn line_count(path: &Path) -> usize {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count()
    }

    #[tokio::test]
    async fn appends_are_loaded_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let backend = JsonlBackend::new(&path, 10);
        let base = Utc::now();

        let mut snapshot: Vec<ActivityRecord> = Vec::new();
        for i in 0..3 {
            let rec = record_at(&format!("r{}", i), "u1", "inventory", base + Duration::seconds(i));
            snapshot.insert(0, rec.clone());
            backend.append(&rec, &snapshot).await.unwrap();
        }

        let loaded = JsonlBackend::new(&path, 10).load().await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r1", "r0"]);
    }

    #[tokio::test]
    async fn compacts_once_slack_is_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let backend = JsonlBackend::new(&path, 3).with_compaction_slack(2);
        let base = Utc::now();

        let mut snapshot: Vec<ActivityRecord> = Vec::new();
        for i in 0..5 {
            let rec = record_at(&format!("r{}", i), "u1", "garage", base + Duration::seconds(i));
            snapshot.insert(0, rec.clone());
            snapshot.truncate(3);
            backend.append(&rec, &snapshot).await.unwrap();
        }
        assert_eq!(line_count(&path), 5);

        let rec = record_at("r5", "u1", "garage", base + Duration::seconds(5));
        snapshot.insert(0, rec.clone());
        snapshot.truncate(3);
        backend.append(&rec, &snapshot).await.unwrap();
        assert_eq!(line_count(&path), 3);

        let loaded = backend.load().await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r5", "r4", "r3"]);
    }

    #[tokio::test]
    async fn load_truncates_to_capacity_and_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let base = Utc::now();
        let mut body = String::new();
        for i in 0..4 {
            let rec = record_at(&format!("r{}", i), "u1", "parts", base + Duration::seconds(i));
            body.push_str(&serde_json::to_string(&rec).unwrap());
            body.push('\n');
            if i == 1 {
                body.push_str("{broken\n");
            }
        }
        std::fs::write(&path, body).unwrap();

        let loaded = JsonlBackend::new(&path, 2).load().await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r3", "r2"]);
    }
}
