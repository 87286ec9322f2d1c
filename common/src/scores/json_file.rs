use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::UserId;
use super::{ScoreEntry, ScoreStore, ScoreStoreError, ScoreTable, TopScoresFeed};

/// Keeps every score in a pretty-printed JSON array. The file is rewritten on
/// each submission; the in-memory table only changes once the write succeeded.
#[derive(Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
    table: ScoreTable,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileScoreStore {
    /// Loads `path` if it exists. A missing file is an empty leaderboard.
    pub async fn open(
        path: impl Into<PathBuf>,
        max_entries: Option<usize>,
    ) -> Result<Self, ScoreStoreError> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str::<Vec<ScoreEntry>>(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!("Loaded {} scores from {}", entries.len(), path.display());

        Ok(Self {
            path,
            table: ScoreTable::with_entries(entries, max_entries),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.table.entries()
    }

    async fn persist(&self, entries: &[ScoreEntry]) -> Result<(), ScoreStoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

impl ScoreStore for JsonFileScoreStore {
    async fn submit_score(
        &self,
        user_id: UserId,
        display_name: String,
        score: u32,
    ) -> Result<ScoreEntry, ScoreStoreError> {
        let _guard = self.write_lock.lock().await;

        let entry = ScoreEntry::new(user_id, display_name, score);
        let updated = self.table.preview_insert(entry.clone());
        self.persist(&updated).await?;
        self.table.replace(updated);

        debug!("Persisted score {} for {} to {}", entry.score, entry.user_id, self.path.display());
        Ok(entry)
    }

    fn top_scores(&self, limit: usize) -> TopScoresFeed {
        self.table.feed(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileScoreStore::open(dir.path().join("scores.json"), None)
            .await
            .unwrap();
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn test_scores_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");

        let store = JsonFileScoreStore::open(&path, None).await.unwrap();
        store
            .submit_score(UserId::new("u1".to_string()), "Ana".to_string(), 30)
            .await
            .unwrap();
        store
            .submit_score(UserId::new("u2".to_string()), "Bob".to_string(), 50)
            .await
            .unwrap();

        let reopened = JsonFileScoreStore::open(&path, None).await.unwrap();
        let names: Vec<_> = reopened.entries().into_iter().map(|e| e.display_name).collect();
        assert_eq!(names, vec!["Bob", "Ana"]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = JsonFileScoreStore::open(&path, None).await;
        assert!(matches!(result, Err(ScoreStoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_publish() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("scores.json");
        std::fs::create_dir_all(path.join("blocker")).unwrap();
        let store = JsonFileScoreStore {
            path: path.clone(),
            table: ScoreTable::new(None),
            write_lock: Arc::new(Mutex::new(())),
        };

        let result = store
            .submit_score(UserId::new("u1".to_string()), "Ana".to_string(), 30)
            .await;
        assert!(result.is_err());
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn test_retention_cap_applies_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let store = JsonFileScoreStore::open(&path, Some(2)).await.unwrap();
        for (i, score) in [10, 40, 20].into_iter().enumerate() {
            store
                .submit_score(UserId::new(format!("u{}", i)), format!("P{}", i), score)
                .await
                .unwrap();
        }

        let reopened = JsonFileScoreStore::open(&path, None).await.unwrap();
        let scores: Vec<_> = reopened.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![40, 20]);
    }
}
