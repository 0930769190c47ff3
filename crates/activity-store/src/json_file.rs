//! JSON snapshot file backend: one file, one JSON array, rewritten on every mutation.

use activity_types::{ActivityBackend, ActivityRecord, StoreError};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Full-overwrite file store. Each save writes a sibling temp file and renames it over the
/// target, so readers see either the old or the new collection, never a partial one.
///
/// Writes cost O(n) in the collection size; the log's capacity keeps n bounded.
pub struct JsonFileBackend {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl ActivityBackend for JsonFileBackend {
    async fn load(&self) -> Result<Vec<ActivityRecord>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    async fn save(&self, records: &[ActivityRecord]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let body = serde_json::to_vec(records)?;
        let tmp = self.temp_path();
        let mut f = tokio::fs::File::create(&tmp).await?;
        f.write_all(&body).await?;
        f.sync_all().await?;
        drop(f);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_types::fixtures::record_at;
    use chrono::Utc;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("log.json"));
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        let backend = JsonFileBackend::new(&path);
        let now = Utc::now();
        let records = vec![
            record_at("newest", "u1", "garage", now),
            record_at("oldest", "u2", "inventory", now - chrono::Duration::minutes(5)),
        ];
        backend.save(&records).await.unwrap();

        let reopened = JsonFileBackend::new(&path);
        let loaded = reopened.load().await.unwrap();
        assert_eq!(loaded, records);
        assert!(!backend.temp_path().exists());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with('['));
    }

    #[tokio::test]
    async fn garbage_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileBackend::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
