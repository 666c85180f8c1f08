//! Passive observer: connects to the server, receives snapshots, renders.

use std::time::Duration;

use ballpit_shared::config::Border;
use ballpit_shared::mass::{check_mass, MassError};
use ballpit_shared::protocol::{ClientMsg, ServerMsg, SnapshotMsg, PROTOCOL_VERSION};
use ballpit_shared::render::Renderer;
use futures_util::{SinkExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_millis(1000);
const MAX_RECONNECT_DELAY: Duration = Duration::from_millis(30_000);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Mass(#[from] MassError),
}

pub fn server_url(address: &str, port: u16) -> String {
    format!("ws://{}:{}/ws", address, port)
}

/// One connection to the server's snapshot stream.
pub struct ObserverClient {
    ws: WsStream,
    border: Border,
}

impl ObserverClient {
    pub async fn connect(address: &str, port: u16) -> Result<Self, ClientError> {
        Self::connect_url(&server_url(address, port)).await
    }

    pub async fn connect_url(url: &str) -> Result<Self, ClientError> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|source| ClientError::Connect {
                url: url.to_string(),
                source,
            })?;
        tracing::info!("Connected to {}", url);
        Ok(Self {
            ws,
            border: Border::default(),
        })
    }

    /// Border announced by the server, or the default until a welcome arrives.
    pub fn border(&self) -> Border {
        self.border
    }

    /// Wait for the next snapshot. Welcomes are absorbed along the way and
    /// undecodable frames are logged and skipped. `Ok(None)` once the
    /// server closes the stream.
    pub async fn next_snapshot(&mut self) -> Result<Option<SnapshotMsg>, ClientError> {
        while let Some(msg) = self.ws.next().await {
            let text = match msg? {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(None),
                _ => continue,
            };
            match serde_json::from_str::<ServerMsg>(&text) {
                Ok(ServerMsg::Snapshot(snapshot)) => return Ok(Some(snapshot)),
                Ok(ServerMsg::Welcome(welcome)) => {
                    if welcome.protocol_version != PROTOCOL_VERSION {
                        tracing::warn!(
                            "Protocol mismatch: server {}, client {}",
                            welcome.protocol_version,
                            PROTOCOL_VERSION
                        );
                    }
                    self.border = welcome.border;
                }
                Err(e) => tracing::warn!("Dropping undecodable frame: {}", e),
            }
        }
        Ok(None)
    }

    /// Render every snapshot until the server goes away.
    pub async fn run<R: Renderer>(mut self, renderer: &mut R) -> Result<(), ClientError> {
        while let Some(snapshot) = self.next_snapshot().await? {
            renderer.render(&self.border, &snapshot.balls);
        }
        tracing::info!("Server closed the snapshot stream");
        Ok(())
    }
}

/// Spawn an observer that renders snapshots from `address:port`,
/// reconnecting with backoff whenever the connection drops.
pub fn start_client<R>(address: impl Into<String>, port: u16, mut renderer: R) -> JoinHandle<()>
where
    R: Renderer + Send + 'static,
{
    let url = server_url(&address.into(), port);
    tokio::spawn(async move {
        let mut reconnect_delay = INITIAL_RECONNECT_DELAY;
        loop {
            match ObserverClient::connect_url(&url).await {
                Ok(client) => {
                    reconnect_delay = INITIAL_RECONNECT_DELAY;
                    if let Err(e) = client.run(&mut renderer).await {
                        tracing::warn!("Observer connection lost: {}", e);
                    }
                }
                Err(e) => tracing::warn!("{}", e),
            }
            tokio::time::sleep(reconnect_delay).await;
            reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
        }
    })
}

/// Ask the server for a ball of `mass` over a dedicated connection.
///
/// The mass is range-checked here. The server accepts the connection but
/// does not act on the request.
pub async fn request_add_ball(address: &str, port: u16, mass: i32) -> Result<(), ClientError> {
    let mass = check_mass(mass)?;
    let url = server_url(address, port);
    let (mut ws, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|source| ClientError::Connect {
            url: url.clone(),
            source,
        })?;

    let json = serde_json::to_string(&ClientMsg::AddBall { mass }).map_err(ClientError::Encode)?;
    ws.send(Message::Text(json.into())).await?;
    tracing::info!("Requested ball of mass {} from {}", mass, url);
    let _ = ws.close(None).await;
    Ok(())
}
