use serde::{Deserialize, Serialize};

use super::types::{Direction, GameOverReason, Point};

/// What a render surface needs to draw one frame. `snake` is head first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeSnapshot {
    pub tick: u64,
    pub grid_size: usize,
    pub snake: Vec<Point>,
    pub food: Option<Point>,
    pub direction: Direction,
    pub score: u32,
    pub is_playing: bool,
    pub is_over: bool,
    pub game_over_reason: Option<GameOverReason>,
}
