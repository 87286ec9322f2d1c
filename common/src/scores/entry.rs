use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub score: u32,
    pub timestamp: DateTime<Utc>,
}

impl ScoreEntry {
    pub fn new(user_id: UserId, display_name: String, score: u32) -> Self {
        Self {
            user_id,
            display_name,
            score,
            timestamp: Utc::now(),
        }
    }

    /// Leaderboard order: higher score first, earlier entry first on ties.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
    }
}
