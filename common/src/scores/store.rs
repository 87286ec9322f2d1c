use std::future::Future;

use crate::UserId;
use super::{ScoreEntry, ScoreStoreError, TopScoresFeed};

/// Where final scores go. Callers treat submission as fire-and-forget: a
/// failure is theirs to log, never to surface into the game.
pub trait ScoreStore: Send + Sync + Clone + 'static {
    fn submit_score(
        &self,
        user_id: UserId,
        display_name: String,
        score: u32,
    ) -> impl Future<Output = Result<ScoreEntry, ScoreStoreError>> + Send;

    /// Live view of the best `limit` entries, score descending.
    fn top_scores(&self, limit: usize) -> TopScoresFeed;
}
