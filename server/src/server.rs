//! Entry points used by the UI layer: start the authoritative server and
//! drive it through a [`ServerHandle`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use ballpit_shared::protocol::SnapshotMsg;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use crate::ball::{Ball, BallError};
use crate::config::ServerConfig;
use crate::game_loop::{run_game_loop, GameCommand};
use crate::replication::ObserverChannel;
use crate::ws::{ws_handler, AppState};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid server configuration: {0}")]
    Config(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("simulation is not running")]
    Stopped,
    #[error(transparent)]
    Ball(#[from] BallError),
}

/// Handle to a running server. Dropping it leaves the server running;
/// call [`ServerHandle::stop`] to shut it down.
pub struct ServerHandle {
    local_addr: SocketAddr,
    game_tx: mpsc::Sender<GameCommand>,
    app_state: AppState,
    game_task: JoinHandle<()>,
    accept_task: JoinHandle<()>,
}

/// Validate `config`, bind the listener, and spawn the tick loop and the
/// connection acceptor.
pub async fn start_server(config: ServerConfig) -> Result<ServerHandle, ServerError> {
    config.validate().map_err(ServerError::Config)?;

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen_addr.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
        addr: config.listen_addr.clone(),
        source,
    })?;

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(config.command_queue_depth);
    let app_state = AppState::new(game_tx.clone(), config.border, config.observer_queue_depth);

    let game_task = tokio::spawn(run_game_loop(game_rx, config));

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state.clone());

    let accept_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Acceptor stopped: {}", e);
        }
    });

    tracing::info!("Ballpit server listening on {}", local_addr);

    Ok(ServerHandle {
        local_addr,
        game_tx,
        app_state,
        game_task,
        accept_task,
    })
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Append a ball of radius `mass` at the spawn point, moving at the
    /// fixed added-ball velocity. Only `mass > 0` is enforced.
    pub async fn add_ball_local(&self, mass: i32) -> Result<(), ServerError> {
        let (response, rx) = oneshot::channel();
        self.send(GameCommand::AddBallOfMass { mass, response }).await?;
        rx.await.map_err(|_| ServerError::Stopped)??;
        Ok(())
    }

    /// Append a fully formed ball.
    pub async fn add_ball(&self, ball: Ball) -> Result<(), ServerError> {
        self.send(GameCommand::AddBall { ball }).await
    }

    /// Give ball `index` a random velocity. `Ok(false)` if there is no such ball.
    pub async fn shoot(&self, index: usize) -> Result<bool, ServerError> {
        let (response, rx) = oneshot::channel();
        self.send(GameCommand::Shoot { index, response }).await?;
        rx.await.map_err(|_| ServerError::Stopped)
    }

    pub async fn set_velocity(&self, index: usize, vx: i32, vy: i32) -> Result<bool, ServerError> {
        let (response, rx) = oneshot::channel();
        self.send(GameCommand::SetVelocity {
            index,
            vx,
            vy,
            response,
        })
        .await?;
        rx.await.map_err(|_| ServerError::Stopped)
    }

    /// Copy of the authoritative ball collection.
    pub async fn balls(&self) -> Result<Vec<Ball>, ServerError> {
        let (response, rx) = oneshot::channel();
        self.send(GameCommand::Snapshot { response }).await?;
        rx.await.map_err(|_| ServerError::Stopped)
    }

    /// Register an in-process observer, e.g. the server-side renderer.
    /// It receives the same per-tick snapshots as network observers.
    pub async fn observe_local(&self) -> Result<mpsc::Receiver<Arc<SnapshotMsg>>, ServerError> {
        let id = self
            .app_state
            .next_observer_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let (channel, rx) = ObserverChannel::new(id, self.app_state.observer_queue_depth);
        self.send(GameCommand::RegisterObserver { channel }).await?;
        Ok(rx)
    }

    /// Stop accepting connections and stop the simulation.
    pub fn stop(self) {
        self.accept_task.abort();
        self.game_task.abort();
        tracing::info!("Ballpit server on {} stopped", self.local_addr);
    }

    async fn send(&self, cmd: GameCommand) -> Result<(), ServerError> {
        self.game_tx.send(cmd).await.map_err(|_| ServerError::Stopped)
    }
}
