use tracing::{debug, warn};

use crate::games::SessionRng;
use super::settings::SnakeSettings;
use super::entity::Snake;
use super::snapshot::SnakeSnapshot;
use super::types::{Direction, GameOverReason, GameStatus, Point, SelfCollisionRule, TickOutcome};

#[derive(Clone, Debug)]
pub struct SnakeGameState {
    pub snake: Snake,
    pub food: Option<Point>,
    pub score: u32,
    pub status: GameStatus,
    pub tick: u64,
    settings: SnakeSettings,
}

impl SnakeGameState {
    pub fn new(settings: SnakeSettings) -> Self {
        Self {
            snake: Snake::new(settings.start_position, settings.start_direction),
            food: None,
            score: 0,
            status: GameStatus::NotStarted,
            tick: 0,
            settings,
        }
    }

    pub fn settings(&self) -> &SnakeSettings {
        &self.settings
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::GameOver(_))
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        match self.status {
            GameStatus::GameOver(reason) => Some(reason),
            _ => None,
        }
    }

    /// Puts the board back to its canonical starting layout and starts playing.
    pub fn reset(&mut self, rng: &mut SessionRng) {
        self.snake = Snake::new(self.settings.start_position, self.settings.start_direction);
        self.score = 0;
        self.tick = 0;
        self.status = GameStatus::Playing;
        self.place_food(rng);
    }

    /// Leaves the current game without a result. The board is kept for display.
    pub fn abandon(&mut self) {
        self.status = GameStatus::NotStarted;
        self.score = 0;
        self.snake.pending_direction = None;
    }

    /// Queues a turn for the next tick. Returns whether it was accepted.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if !self.is_playing() || direction.is_opposite(&self.snake.direction) {
            return false;
        }
        self.snake.pending_direction = Some(direction);
        true
    }

    pub fn update(&mut self, rng: &mut SessionRng) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Idle;
        }

        self.tick += 1;
        self.snake.apply_pending_direction();

        let head = self.snake.head();
        let Some(next_head) = head.step(self.snake.direction, self.settings.grid_size) else {
            return self.finish(GameOverReason::WallCollision);
        };

        let eats = self.food == Some(next_head);
        if self.hits_body(&next_head, eats) {
            return self.finish(GameOverReason::SelfCollision);
        }

        self.snake.push_head(next_head);

        if eats {
            self.score += self.settings.food_reward;
            debug!(
                "Food eaten at ({}, {}). Score: {}",
                next_head.x, next_head.y, self.score
            );
            self.place_food(rng);
            TickOutcome::Ate { score: self.score }
        } else {
            self.snake.drop_tail();
            TickOutcome::Moved
        }
    }

    pub fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            tick: self.tick,
            grid_size: self.settings.grid_size,
            snake: self.snake.body.iter().copied().collect(),
            food: self.food,
            direction: self.snake.direction,
            score: self.score,
            is_playing: self.is_playing(),
            is_over: self.is_over(),
            game_over_reason: self.game_over_reason(),
        }
    }

    fn hits_body(&self, next_head: &Point, eats: bool) -> bool {
        if !self.snake.occupies(next_head) {
            return false;
        }
        match self.settings.self_collision_rule {
            SelfCollisionRule::IncludeTail => true,
            SelfCollisionRule::ExcludeVacatedTail => {
                let tail_moves_away = !eats && self.snake.len() > 1;
                !(tail_moves_away && *next_head == self.snake.tail())
            }
        }
    }

    fn finish(&mut self, reason: GameOverReason) -> TickOutcome {
        debug!("Game over after {} ticks: {:?}, score {}", self.tick, reason, self.score);
        self.status = GameStatus::GameOver(reason);
        self.snake.pending_direction = None;
        TickOutcome::GameOver(reason)
    }

    fn place_food(&mut self, rng: &mut SessionRng) {
        let grid_size = self.settings.grid_size;

        for _ in 0..self.settings.max_food_attempts {
            let candidate = Point::new(
                rng.random_range(0..grid_size),
                rng.random_range(0..grid_size),
            );
            if !self.snake.occupies(&candidate) {
                self.food = Some(candidate);
                return;
            }
        }

        let free_cells: Vec<Point> = (0..grid_size)
            .flat_map(|y| (0..grid_size).map(move |x| Point::new(x, y)))
            .filter(|p| !self.snake.occupies(p))
            .collect();

        self.food = rng.pick_index(free_cells.len()).map(|i| free_cells[i]);
        if self.food.is_none() {
            warn!("No free cell left for food on a {}x{} grid", grid_size, grid_size);
        }
    }

    #[cfg(test)]
    fn with_snake(
        settings: SnakeSettings,
        segments: &[Point],
        direction: Direction,
        food: Option<Point>,
    ) -> Self {
        let mut state = Self::new(settings);
        state.snake = Snake::from_segments(segments, direction).expect("valid test snake");
        state.food = food;
        state.status = GameStatus::Playing;
        state
    }
}
