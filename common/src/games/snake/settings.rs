use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;
use super::types::{Direction, Point, SelfCollisionRule};

pub const DEFAULT_GRID_SIZE: usize = 20;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 150;
pub const DEFAULT_FOOD_REWARD: u32 = 10;
pub const DEFAULT_MAX_FOOD_ATTEMPTS: u32 = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeSettings {
    pub grid_size: usize,
    pub start_position: Point,
    pub start_direction: Direction,
    pub tick_interval_ms: u64,
    pub food_reward: u32,
    pub self_collision_rule: SelfCollisionRule,
    /// Random draws before falling back to picking from the free cells.
    pub max_food_attempts: u32,
}

impl SnakeSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            start_position: Point::new(10, 10),
            start_direction: Direction::Right,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            food_reward: DEFAULT_FOOD_REWARD,
            self_collision_rule: SelfCollisionRule::default(),
            max_food_attempts: DEFAULT_MAX_FOOD_ATTEMPTS,
        }
    }
}

impl Validate for SnakeSettings {
    fn validate(&self) -> Result<(), String> {
        if self.grid_size < 2 || self.grid_size > 100 {
            return Err("Grid size must be between 2 and 100".to_string());
        }
        if !self.start_position.is_inside(self.grid_size) {
            return Err(format!(
                "Start position ({}, {}) is outside the {}x{} grid",
                self.start_position.x, self.start_position.y, self.grid_size, self.grid_size
            ));
        }
        if self.tick_interval_ms < 20 || self.tick_interval_ms > 5000 {
            return Err("Tick interval must be between 20ms and 5000ms".to_string());
        }
        if self.food_reward == 0 {
            return Err("Food reward must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = SnakeSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tick_interval(), Duration::from_millis(150));
        assert_eq!(settings.food_reward, 10);
    }

    #[test]
    fn test_start_position_outside_grid_is_rejected() {
        let settings = SnakeSettings {
            grid_size: 8,
            ..SnakeSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_tick_interval_bounds() {
        let settings = SnakeSettings {
            tick_interval_ms: 5,
            ..SnakeSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
