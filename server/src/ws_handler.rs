use axum::extract::ws::{Message, WebSocket};
use common::ConnectionId;
use common::account::{AccountError, AccountService, LocalAccountService, UserIdentity};
use common::games::snake::{
    GameOverSummary, SnakeCommand, SnakeEngine, SnakeSession, SnakeSettings, StartOutcome,
};
use common::scores::{Leaderboard, NO_SCORES_MESSAGE, ScoreEntry, ScoreStore, TopScoresFeed};
use futures_util::SinkExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::broadcaster::{ClientSender, WsBroadcaster};
use crate::protocol::{ClientMessage, ProtocolError, ServerMessage};
use crate::web_server::WebServerState;

const OUTBOUND_QUEUE_SIZE: usize = 128;
const COMMAND_QUEUE_SIZE: usize = 32;

struct RunningGame {
    commands: mpsc::Sender<SnakeCommand>,
    handle: JoinHandle<GameOverSummary>,
}

impl RunningGame {
    async fn stop(self, connection_id: ConnectionId) {
        // Already finished games have dropped their receiver.
        let _ = self.commands.send(SnakeCommand::Stop).await;
        match self.handle.await {
            Ok(summary) => debug!("[{}] Game finished: {:?}", connection_id, summary),
            Err(e) => warn!("[{}] Game task failed: {}", connection_id, e),
        }
    }
}

/// Per-connection state: one account session and at most one running game.
struct Connection<S: ScoreStore> {
    id: ConnectionId,
    account: LocalAccountService,
    settings: SnakeSettings,
    scores: S,
    tx: ClientSender,
    game: Option<RunningGame>,
}

pub async fn handle_websocket<S: ScoreStore>(
    socket: WebSocket,
    state: WebServerState<S>,
    connection_id: ConnectionId,
) {
    let (mut ws_sender, mut ws_receiver) = futures_util::StreamExt::split(socket);
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE_SIZE);

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!("[{}] Failed to encode message: {}", connection_id, e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    info!("[{}] WebSocket connected", connection_id);

    let mut connection = Connection {
        id: connection_id,
        account: LocalAccountService::new(state.accounts.clone()),
        settings: state.config.game.clone(),
        scores: state.scores.clone(),
        tx: tx.clone(),
        game: None,
    };

    let leaderboard_task = tokio::spawn(forward_leaderboard(
        state.scores.top_scores(state.config.leaderboard_size),
        connection.account.clone(),
        tx.clone(),
    ));

    connection.send(ServerMessage::Session { user: None }).await;

    while let Some(result) = ws_receiver.next().await {
        let message = match result {
            Ok(Message::Text(text)) => ClientMessage::parse(text.as_str()),
            Ok(Message::Binary(_)) => Err(ProtocolError::BinaryFrame),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("[{}] WebSocket error: {}", connection_id, e);
                break;
            }
        };

        match message {
            Ok(message) => connection.handle_message(message).await,
            Err(e) => {
                debug!("[{}] Rejected frame: {}", connection_id, e);
                connection.send(ServerMessage::error(e.to_string())).await;
            }
        }
    }

    info!("[{}] WebSocket connection ended", connection_id);
    if let Some(game) = connection.game.take() {
        game.stop(connection_id).await;
    }
    leaderboard_task.abort();
    send_task.abort();
}

impl<S: ScoreStore> Connection<S> {
    async fn handle_message(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::Register {
                email,
                password,
                display_name,
            } => {
                let result = self.account.register(&email, &password, &display_name);
                self.report_auth(result).await;
            }
            ClientMessage::Login { email, password } => {
                let result = self.account.sign_in(&email, &password);
                self.report_auth(result).await;
            }
            ClientMessage::Logout => {
                // A running game sees the sign-out and abandons itself.
                self.account.sign_out();
                self.send(ServerMessage::Session { user: None }).await;
            }
            ClientMessage::Start => self.start_game().await,
            ClientMessage::Turn { direction } => {
                if let Some(game) = &self.game
                    && game.commands.send(SnakeCommand::Turn(direction)).await.is_err()
                {
                    debug!("[{}] Turn ignored, game already over", self.id);
                }
            }
            ClientMessage::Stop => {
                if let Some(game) = self.game.take() {
                    game.stop(self.id).await;
                }
            }
        }
    }

    async fn start_game(&mut self) {
        let mut engine = SnakeEngine::with_random_seed(self.settings.clone());
        if engine.initialize(&self.account) == StartOutcome::SignInRequired {
            self.send(ServerMessage::SignInRequired).await;
            return;
        }

        if let Some(previous) = self.game.take() {
            previous.stop(self.id).await;
        }

        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let handle = tokio::spawn(SnakeSession::run(
            engine,
            self.account.clone(),
            command_rx,
            WsBroadcaster::new(self.id, self.tx.clone()),
            self.scores.clone(),
        ));
        self.game = Some(RunningGame { commands, handle });
    }

    async fn report_auth(&self, result: Result<UserIdentity, AccountError>) {
        let message = match result {
            Ok(user) => ServerMessage::Session { user: Some(user) },
            Err(e) => ServerMessage::AuthError {
                message: e.to_string(),
            },
        };
        self.send(message).await;
    }

    async fn send(&self, message: ServerMessage) {
        if let Err(e) = self.tx.send(message).await {
            warn!("[{}] Failed to send message: {}", self.id, e);
        }
    }
}

enum LeaderboardUpdate {
    Scores(Vec<ScoreEntry>),
    Session(Option<UserIdentity>),
}

/// Pushes the top scores on every store change, and again on sign-in or
/// sign-out so the current user's rows stay highlighted.
async fn forward_leaderboard(feed: TopScoresFeed, account: impl AccountService, tx: ClientSender) {
    let scores = feed.into_stream().map(LeaderboardUpdate::Scores);
    let sessions = WatchStream::from_changes(account.subscribe()).map(LeaderboardUpdate::Session);
    let updates = scores.merge(sessions);
    tokio::pin!(updates);

    let mut entries = Vec::new();
    let mut user_id = account.current_user().map(|user| user.user_id);

    while let Some(update) = updates.next().await {
        match update {
            LeaderboardUpdate::Scores(next) => entries = next,
            LeaderboardUpdate::Session(user) => user_id = user.map(|user| user.user_id),
        }

        let board = Leaderboard::build(&entries, user_id.as_ref());
        let message = board.is_empty().then(|| NO_SCORES_MESSAGE.to_string());
        let frame = ServerMessage::Leaderboard {
            entries: board.rows,
            message,
        };
        if tx.send(frame).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use common::account::AccountDirectory;
    use common::scores::InMemoryScoreStore;

    type LeaderboardFrame = (Vec<String>, Vec<bool>, Option<String>);

    async fn next_leaderboard(rx: &mut mpsc::Receiver<ServerMessage>) -> LeaderboardFrame {
        match rx.recv().await {
            Some(ServerMessage::Leaderboard { entries, message }) => (
                entries.iter().map(|row| row.display_name.clone()).collect(),
                entries.iter().map(|row| row.is_current_user).collect(),
                message,
            ),
            other => panic!("expected leaderboard, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_leaderboard_follows_store_and_session() {
        let store = InMemoryScoreStore::new();
        let account = LocalAccountService::new(AccountDirectory::new());
        let (tx, mut rx) = mpsc::channel(16);

        let task = tokio::spawn(forward_leaderboard(store.top_scores(10), account.clone(), tx));

        let (names, _, message) = next_leaderboard(&mut rx).await;
        assert!(names.is_empty());
        assert_eq!(message.as_deref(), Some(NO_SCORES_MESSAGE));

        let user = account.register("ana@example.com", "secret1", "Ana").unwrap();
        let (_, highlights, _) = next_leaderboard(&mut rx).await;
        assert!(highlights.is_empty());

        store
            .submit_score(user.user_id.clone(), "Ana".to_string(), 40)
            .await
            .unwrap();
        store
            .submit_score(UserId::new("other".to_string()), "Bob".to_string(), 90)
            .await
            .unwrap();

        // Both submissions may arrive as one update.
        let mut latest = next_leaderboard(&mut rx).await;
        while latest.0.len() < 2 {
            latest = next_leaderboard(&mut rx).await;
        }
        assert_eq!(latest.0, vec!["Bob", "Ana"]);
        assert_eq!(latest.1, vec![false, true]);
        assert_eq!(latest.2, None);

        account.sign_out();
        let (_, highlights, _) = next_leaderboard(&mut rx).await;
        assert_eq!(highlights, vec![false, false]);

        task.abort();
    }
}
