use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Json, Router,
    extract::{Query, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use common::ConnectionId;
use common::account::AccountDirectory;
use common::scores::{ScoreEntry, ScoreStore};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{info, warn};

use crate::server_config::ServerConfig;
use crate::ws_handler::handle_websocket;

#[derive(Clone)]
pub struct WebServerState<S: ScoreStore> {
    pub config: Arc<ServerConfig>,
    pub accounts: AccountDirectory,
    pub scores: S,
    next_connection_id: Arc<AtomicU64>,
}

impl<S: ScoreStore> WebServerState<S> {
    pub fn new(config: ServerConfig, accounts: AccountDirectory, scores: S) -> Self {
        Self {
            config: Arc::new(config),
            accounts,
            scores,
            next_connection_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn allocate_connection_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_connection_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

pub fn build_router<S: ScoreStore>(state: WebServerState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_upgrade_handler::<S>))
        .route("/api/leaderboard", get(leaderboard_handler::<S>))
        .route("/health", get(health_handler))
        .nest_service("/ui", ServeDir::new(&state.config.static_files_path))
        .layer(cors)
        .with_state(state)
}

pub async fn run_web_server<S: ScoreStore>(state: WebServerState<S>) -> std::io::Result<()> {
    let addr = state.config.listen_address.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn ws_upgrade_handler<S: ScoreStore>(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState<S>>,
) -> impl IntoResponse {
    let connection_id = state.allocate_connection_id();
    ws.on_upgrade(move |socket| handle_websocket(socket, state, connection_id))
}

async fn leaderboard_handler<S: ScoreStore>(
    State(state): State<WebServerState<S>>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Vec<ScoreEntry>> {
    let limit = state.config.clamp_leaderboard_limit(query.limit);
    Json(state.scores.top_scores(limit).current())
}

async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use common::scores::InMemoryScoreStore;

    async fn state_with_scores(scores: &[u32]) -> WebServerState<InMemoryScoreStore> {
        let store = InMemoryScoreStore::new();
        for (i, score) in scores.iter().enumerate() {
            store
                .submit_score(UserId::new(format!("u{}", i)), format!("P{}", i), *score)
                .await
                .unwrap();
        }
        WebServerState::new(ServerConfig::default(), AccountDirectory::new(), store)
    }

    #[tokio::test]
    async fn test_leaderboard_endpoint_orders_and_limits() {
        let state = state_with_scores(&[10, 50, 30]).await;

        let Json(entries) = leaderboard_handler(
            State(state),
            Query(LeaderboardQuery { limit: Some(2) }),
        )
        .await;

        let scores: Vec<_> = entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![50, 30]);
    }

    #[tokio::test]
    async fn test_leaderboard_endpoint_uses_configured_default() {
        let state = state_with_scores(&[1; 15]).await;

        let query = Query(LeaderboardQuery::default());
        let Json(entries) = leaderboard_handler(State(state), query).await;

        assert_eq!(entries.len(), 10);
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health_handler().await, "OK");
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let state = state_with_scores(&[]).await;
        let first = state.allocate_connection_id();
        let second = state.clone().allocate_connection_id();
        assert_ne!(first, second);
    }
}
