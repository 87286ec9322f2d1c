use tokio::sync::watch;
use tracing::{debug, info};

use crate::account::AccountService;
use crate::games::SessionRng;
use super::game_state::SnakeGameState;
use super::settings::SnakeSettings;
use super::snapshot::SnakeSnapshot;
use super::types::{Direction, TickOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    SignInRequired,
}

/// Owns the authoritative game state of one player and publishes a snapshot
/// after every change.
pub struct SnakeEngine {
    state: SnakeGameState,
    rng: SessionRng,
    notifier: watch::Sender<SnakeSnapshot>,
}

impl SnakeEngine {
    pub fn new(settings: SnakeSettings, rng: SessionRng) -> Self {
        let state = SnakeGameState::new(settings);
        let notifier = watch::Sender::new(state.snapshot());
        Self { state, rng, notifier }
    }

    pub fn with_random_seed(settings: SnakeSettings) -> Self {
        Self::new(settings, SessionRng::from_random())
    }

    pub fn state(&self) -> &SnakeGameState {
        &self.state
    }

    pub fn settings(&self) -> &SnakeSettings {
        self.state.settings()
    }

    /// Starts a fresh game for the signed-in user. Without a user nothing changes.
    pub fn initialize(&mut self, account: &impl AccountService) -> StartOutcome {
        let Some(user) = account.current_user() else {
            debug!("Start rejected: no signed-in user");
            return StartOutcome::SignInRequired;
        };

        self.state.reset(&mut self.rng);
        info!("Snake game started for {} (seed {})", user.user_id, self.rng.seed());
        self.publish();
        StartOutcome::Started
    }

    /// Queues a turn for the next tick. Ignored without a signed-in user.
    pub fn set_direction(&mut self, account: &impl AccountService, direction: Direction) -> bool {
        if !account.is_authenticated() {
            return false;
        }
        self.state.set_direction(direction)
    }

    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.state.update(&mut self.rng);
        if outcome != TickOutcome::Idle {
            self.publish();
        }
        outcome
    }

    pub fn abandon(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        debug!("Snake game abandoned at tick {}", self.state.tick);
        self.state.abandon();
        self.publish();
    }

    pub fn snapshot(&self) -> SnakeSnapshot {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SnakeSnapshot> {
        self.notifier.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SnakeGameState {
        &mut self.state
    }

    fn publish(&self) {
        self.notifier.send_replace(self.state.snapshot());
    }
}
