use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use super::ScoreEntry;

/// Ranked entries behind a watch channel; every change wakes all feeds.
#[derive(Clone)]
pub struct ScoreTable {
    entries: Arc<watch::Sender<Vec<ScoreEntry>>>,
    max_entries: Option<usize>,
}

impl ScoreTable {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self::with_entries(Vec::new(), max_entries)
    }

    pub fn with_entries(entries: Vec<ScoreEntry>, max_entries: Option<usize>) -> Self {
        let ranked = rank(entries, max_entries);
        Self {
            entries: Arc::new(watch::Sender::new(ranked)),
            max_entries,
        }
    }

    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.entries.borrow().clone()
    }

    /// The table as it would look with `entry` added, without publishing it.
    pub fn preview_insert(&self, entry: ScoreEntry) -> Vec<ScoreEntry> {
        let mut entries = self.entries();
        entries.push(entry);
        rank(entries, self.max_entries)
    }

    pub fn insert(&self, entry: ScoreEntry) {
        let max_entries = self.max_entries;
        self.entries.send_modify(|entries| {
            entries.push(entry);
            entries.sort_by(ScoreEntry::rank_cmp);
            if let Some(max) = max_entries {
                entries.truncate(max);
            }
        });
    }

    pub fn replace(&self, entries: Vec<ScoreEntry>) {
        self.entries.send_replace(rank(entries, self.max_entries));
    }

    pub fn feed(&self, limit: usize) -> TopScoresFeed {
        TopScoresFeed {
            rx: self.entries.subscribe(),
            limit,
        }
    }
}

fn rank(mut entries: Vec<ScoreEntry>, max_entries: Option<usize>) -> Vec<ScoreEntry> {
    entries.sort_by(ScoreEntry::rank_cmp);
    if let Some(max) = max_entries {
        entries.truncate(max);
    }
    entries
}

pub struct TopScoresFeed {
    rx: watch::Receiver<Vec<ScoreEntry>>,
    limit: usize,
}

impl TopScoresFeed {
    /// Current top entries; marks them as seen.
    pub fn current(&mut self) -> Vec<ScoreEntry> {
        top(&self.rx.borrow_and_update(), self.limit)
    }

    /// Yields the current top entries first, then one item per change.
    pub fn into_stream(self) -> impl Stream<Item = Vec<ScoreEntry>> + Send + 'static {
        let limit = self.limit;
        WatchStream::new(self.rx).map(move |entries| top(&entries, limit))
    }
}

fn top(entries: &[ScoreEntry], limit: usize) -> Vec<ScoreEntry> {
    entries.iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;
    use chrono::{TimeZone, Utc};

    fn entry(name: &str, score: u32, second: u32) -> ScoreEntry {
        ScoreEntry {
            user_id: UserId::new(name.to_lowercase()),
            display_name: name.to_string(),
            score,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, second).unwrap(),
        }
    }

    #[test]
    fn test_entries_ranked_by_score_then_time() {
        let table = ScoreTable::new(None);
        table.insert(entry("Late", 50, 30));
        table.insert(entry("Low", 10, 0));
        table.insert(entry("Early", 50, 10));
        table.insert(entry("High", 90, 20));

        let names: Vec<_> = table.entries().into_iter().map(|e| e.display_name).collect();
        assert_eq!(names, vec!["High", "Early", "Late", "Low"]);
    }

    #[test]
    fn test_max_entries_drops_lowest() {
        let table = ScoreTable::new(Some(2));
        table.insert(entry("A", 10, 0));
        table.insert(entry("B", 30, 0));
        table.insert(entry("C", 20, 0));
        let scores: Vec<_> = table.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![30, 20]);
    }

    #[test]
    fn test_preview_does_not_publish() {
        let table = ScoreTable::new(None);
        let preview = table.preview_insert(entry("A", 10, 0));
        assert_eq!(preview.len(), 1);
        assert!(table.entries().is_empty());
    }

    #[tokio::test]
    async fn test_feed_limits_and_follows_changes() {
        let table = ScoreTable::new(None);
        for i in 0..5 {
            table.insert(entry(&format!("P{}", i), i * 10, i));
        }
        let mut feed = table.feed(3);
        let current = feed.current();
        assert_eq!(current.iter().map(|e| e.score).collect::<Vec<_>>(), vec![40, 30, 20]);

        let mut stream = Box::pin(feed.into_stream());
        assert_eq!(stream.next().await.unwrap(), current);

        table.insert(entry("Top", 100, 9));
        let updated = stream.next().await.unwrap();
        assert_eq!(updated.len(), 3);
        assert_eq!(updated[0].display_name, "Top");
    }

    #[tokio::test]
    async fn test_feed_stream_starts_with_current_value() {
        let table = ScoreTable::new(None);
        table.insert(entry("A", 10, 0));
        let mut stream = Box::pin(table.feed(10).into_stream());

        let first = stream.next().await.unwrap();
        assert_eq!(first.len(), 1);

        table.insert(entry("B", 20, 1));
        let second = stream.next().await.unwrap();
        assert_eq!(second[0].display_name, "B");
    }
}
