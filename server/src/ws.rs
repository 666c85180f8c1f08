//! Connection acceptor. Every upgraded WebSocket becomes an observer
//! channel; inbound payloads are drained but never decoded.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use ballpit_shared::config::Border;
use ballpit_shared::protocol::{ServerMsg, WelcomeMsg, PROTOCOL_VERSION};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::game_loop::GameCommand;
use crate::replication::{encode_snapshot, ObserverChannel};

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub border: Border,
    pub observer_queue_depth: usize,
    pub next_observer_id: Arc<AtomicU32>,
}

impl AppState {
    pub fn new(
        game_tx: mpsc::Sender<GameCommand>,
        border: Border,
        observer_queue_depth: usize,
    ) -> Self {
        Self {
            game_tx,
            border,
            observer_queue_depth,
            next_observer_id: Arc::new(AtomicU32::new(1)),
        }
    }
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    let id = app_state.next_observer_id.fetch_add(1, Ordering::Relaxed);
    let (channel, mut snapshot_rx) = ObserverChannel::new(id, app_state.observer_queue_depth);
    if app_state
        .game_tx
        .send(GameCommand::RegisterObserver { channel })
        .await
        .is_err()
    {
        tracing::error!("Failed to register observer {}", id);
        return;
    }

    tracing::info!("Observer {} connected", id);

    let welcome = ServerMsg::Welcome(WelcomeMsg {
        protocol_version: PROTOCOL_VERSION,
        border: app_state.border,
    });
    match serde_json::to_string(&welcome) {
        Ok(json) => {
            if let Err(e) = sink.send(Message::Text(json.into())).await {
                tracing::warn!("Observer {} welcome failed: {}", id, e);
                return;
            }
        }
        Err(e) => {
            tracing::error!("Failed to encode welcome: {}", e);
            return;
        }
    }

    loop {
        tokio::select! {
            // Observer -> Server: drained, not decoded
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::trace!("Observer {} sent {} bytes, ignored", id, text.len());
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::trace!("Observer {} sent {} bytes, ignored", id, data.len());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!("Observer {} read failed: {}", id, e);
                        break;
                    }
                    _ => {} // ping/pong
                }
            }

            // Server -> Observer
            snapshot = snapshot_rx.recv() => {
                let Some(snapshot) = snapshot else { break };
                let json = match encode_snapshot(&snapshot) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to encode snapshot: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json.into())).await {
                    tracing::warn!("Observer {} write failed: {}", id, e);
                    break;
                }
            }
        }
    }

    // The channel stays registered; later broadcasts to it fail and are logged.
    tracing::info!("Observer {} disconnected", id);
}
