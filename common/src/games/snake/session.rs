use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::account::{AccountService, UserIdentity};
use crate::games::GameBroadcaster;
use crate::scores::ScoreStore;
use super::engine::SnakeEngine;
use super::types::{Direction, GameOverReason, TickOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnakeCommand {
    Turn(Direction),
    Stop,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverSummary {
    pub score: u32,
    pub reason: Option<GameOverReason>,
    /// Stopped by the player or by sign-out. Such games are never submitted.
    pub abandoned: bool,
    pub ticks: u64,
    pub player: Option<String>,
}

#[derive(Clone, Copy)]
enum Ending {
    Collision(GameOverReason),
    Abandoned,
}

pub struct SnakeSession;

impl SnakeSession {
    /// Drives an already initialized engine until the game ends.
    pub async fn run<A, B, S>(
        mut engine: SnakeEngine,
        account: A,
        mut commands: mpsc::Receiver<SnakeCommand>,
        broadcaster: B,
        score_store: S,
    ) -> GameOverSummary
    where
        A: AccountService,
        B: GameBroadcaster,
        S: ScoreStore,
    {
        let player = account.current_user();
        let player_name = player.as_ref().map(|user| user.leaderboard_name().to_string());

        if !engine.state().is_playing() {
            debug!("Session started without a running game");
            return GameOverSummary {
                score: 0,
                reason: None,
                abandoned: true,
                ticks: 0,
                player: player_name,
            };
        }

        let mut session_rx = account.subscribe();
        session_rx.mark_unchanged();

        let mut tick_timer = interval(engine.settings().tick_interval());
        // The first tick of an interval completes immediately.
        tick_timer.tick().await;
        broadcaster.broadcast_state(engine.snapshot()).await;

        let mut commands_open = true;
        let ending = loop {
            tokio::select! {
                _ = tick_timer.tick() => {
                    let outcome = engine.tick();
                    broadcaster.broadcast_state(engine.snapshot()).await;
                    if let TickOutcome::GameOver(reason) = outcome {
                        break Ending::Collision(reason);
                    }
                }
                command = commands.recv(), if commands_open => match command {
                    Some(SnakeCommand::Turn(direction)) => {
                        engine.set_direction(&account, direction);
                    }
                    Some(SnakeCommand::Stop) => break Ending::Abandoned,
                    None => commands_open = false,
                },
                changed = session_rx.changed() => {
                    let current = account.current_user();
                    if changed.is_err() || !same_user(player.as_ref(), current.as_ref()) {
                        info!("Session changed mid-game, abandoning");
                        break Ending::Abandoned;
                    }
                }
            }
        };

        let state = engine.state();
        let summary = GameOverSummary {
            score: state.score,
            reason: match ending {
                Ending::Collision(reason) => Some(reason),
                Ending::Abandoned => None,
            },
            abandoned: matches!(ending, Ending::Abandoned),
            ticks: state.tick,
            player: player_name,
        };

        if summary.abandoned {
            engine.abandon();
            broadcaster.broadcast_state(engine.snapshot()).await;
        } else if summary.score > 0
            && let Some(user) = account.current_user()
        {
            submit_final_score(score_store, user, summary.score);
        }

        broadcaster.broadcast_game_over(summary.clone()).await;
        summary
    }
}

fn same_user(a: Option<&UserIdentity>, b: Option<&UserIdentity>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.user_id == b.user_id,
        (None, None) => true,
        _ => false,
    }
}

fn submit_final_score<S: ScoreStore>(score_store: S, user: UserIdentity, score: u32) {
    tokio::spawn(async move {
        let display_name = user.leaderboard_name().to_string();
        match score_store
            .submit_score(user.user_id.clone(), display_name, score)
            .await
        {
            Ok(entry) => info!("Saved score {} for {}", entry.score, entry.user_id),
            Err(e) => warn!("Failed to save score {} for {}: {}", score, user.user_id, e),
        }
    });
}
