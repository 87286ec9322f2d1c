use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::UserId;
use super::ScoreEntry;

pub const NO_SCORES_MESSAGE: &str = "No scores yet. Be the first to play!";

const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub display_name: String,
    pub score: u32,
    pub points_label: String,
    pub date: String,
    pub is_current_user: bool,
}

/// Display-ready leaderboard. Rows come in the order the store ranked them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn build(entries: &[ScoreEntry], current_user: Option<&UserId>) -> Self {
        Self::build_in(entries, current_user, &Local)
    }

    pub fn build_in<Tz: TimeZone>(
        entries: &[ScoreEntry],
        current_user: Option<&UserId>,
        tz: &Tz,
    ) -> Self
    where
        Tz::Offset: Display,
    {
        let rows = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| LeaderboardRow {
                rank: index + 1,
                display_name: entry.display_name.clone(),
                score: entry.score,
                points_label: format!("{} pts", entry.score),
                date: format_date_in(&entry.timestamp, tz),
                is_current_user: current_user.is_some_and(|user| *user == entry.user_id),
            })
            .collect();

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn format_date_in<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    timestamp.with_timezone(tz).format(DATE_FORMAT).to_string()
}
