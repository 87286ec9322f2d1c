use common::ConnectionId;
use common::games::GameBroadcaster;
use common::games::snake::{GameOverSummary, SnakeSnapshot};
use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::ServerMessage;

pub type ClientSender = mpsc::Sender<ServerMessage>;

/// Forwards game frames to the outbound queue of one WebSocket.
#[derive(Clone)]
pub struct WsBroadcaster {
    connection_id: ConnectionId,
    sender: ClientSender,
}

impl std::fmt::Debug for WsBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsBroadcaster")
            .field("connection_id", &self.connection_id)
            .finish()
    }
}

impl WsBroadcaster {
    pub fn new(connection_id: ConnectionId, sender: ClientSender) -> Self {
        Self {
            connection_id,
            sender,
        }
    }

    async fn send(&self, message: ServerMessage) {
        if let Err(e) = self.sender.send(message).await {
            debug!("[{}] Dropping game frame, connection closed: {}", self.connection_id, e);
        }
    }
}

impl GameBroadcaster for WsBroadcaster {
    async fn broadcast_state(&self, snapshot: SnakeSnapshot) {
        self.send(ServerMessage::State { snapshot }).await;
    }

    async fn broadcast_game_over(&self, summary: GameOverSummary) {
        self.send(ServerMessage::GameOver { summary }).await;
    }
}
