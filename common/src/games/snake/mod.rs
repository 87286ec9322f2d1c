mod engine;
mod entity;
mod game_state;
mod session;
mod settings;
mod snapshot;
mod types;

pub use engine::{SnakeEngine, StartOutcome};
pub use entity::Snake;
pub use game_state::SnakeGameState;
pub use session::{GameOverSummary, SnakeCommand, SnakeSession};
pub use settings::{
    DEFAULT_FOOD_REWARD, DEFAULT_GRID_SIZE, DEFAULT_MAX_FOOD_ATTEMPTS, DEFAULT_TICK_INTERVAL_MS,
    SnakeSettings,
};
pub use snapshot::SnakeSnapshot;
pub use types::{Direction, GameOverReason, GameStatus, Point, SelfCollisionRule, TickOutcome};
