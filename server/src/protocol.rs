use common::account::UserIdentity;
use common::games::snake::{Direction, GameOverSummary, SnakeSnapshot};
use common::scores::LeaderboardRow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("binary frames are not supported")]
    BinaryFrame,
}

/// Browser to server. Every frame is a JSON object tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Register {
        email: String,
        password: String,
        display_name: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Start,
    Turn {
        direction: Direction,
    },
    Stop,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Session {
        user: Option<UserIdentity>,
    },
    AuthError {
        message: String,
    },
    SignInRequired,
    State {
        snapshot: SnakeSnapshot,
    },
    GameOver {
        summary: GameOverSummary,
    },
    Leaderboard {
        entries: Vec<LeaderboardRow>,
        /// Set when there is nothing to show.
        message: Option<String>,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
