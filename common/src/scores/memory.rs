use tracing::debug;

use crate::UserId;
use super::{ScoreEntry, ScoreStore, ScoreStoreError, ScoreTable, TopScoresFeed};

#[derive(Clone)]
pub struct InMemoryScoreStore {
    table: ScoreTable,
}

impl Default for InMemoryScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self {
            table: ScoreTable::new(None),
        }
    }

    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.table.entries()
    }
}

impl ScoreStore for InMemoryScoreStore {
    async fn submit_score(
        &self,
        user_id: UserId,
        display_name: String,
        score: u32,
    ) -> Result<ScoreEntry, ScoreStoreError> {
        let entry = ScoreEntry::new(user_id, display_name, score);
        debug!("Storing score {} for {}", entry.score, entry.user_id);
        self.table.insert(entry.clone());
        Ok(entry)
    }

    fn top_scores(&self, limit: usize) -> TopScoresFeed {
        self.table.feed(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_submit_and_read_back() {
        let store = InMemoryScoreStore::new();
        let mut top_scores = Box::pin(store.top_scores(10).into_stream());
        assert!(top_scores.next().await.unwrap().is_empty());

        store
            .submit_score(UserId::new("u1".to_string()), "Ana".to_string(), 40)
            .await
            .unwrap();
        store
            .submit_score(UserId::new("u2".to_string()), "Bob".to_string(), 70)
            .await
            .unwrap();

        // Both inserts may be observed as one change.
        let mut top = top_scores.next().await.unwrap();
        while top.len() < 2 {
            top = top_scores.next().await.unwrap();
        }
        let names: Vec<_> = top.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Ana"]);
        assert_eq!(store.entries().len(), 2);
    }
}
