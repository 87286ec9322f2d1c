mod entry;
mod error;
mod json_file;
mod leaderboard;
mod memory;
mod store;
mod table;

pub use entry::ScoreEntry;
pub use error::ScoreStoreError;
pub use json_file::JsonFileScoreStore;
pub use leaderboard::{Leaderboard, LeaderboardRow, NO_SCORES_MESSAGE, format_date_in};
pub use memory::InMemoryScoreStore;
pub use store::ScoreStore;
pub use table::{ScoreTable, TopScoresFeed};

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;
