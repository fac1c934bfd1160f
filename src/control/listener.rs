//! Dashboard-side control channel — the listening endpoint.
//!
//! The dashboard binds before the engine starts, accepts exactly one peer,
//! and then exchanges messages over it: commands out, status notifications
//! in. `poll_status` is non-blocking so request handlers deriving display
//! text never stall on the engine.

use futures_util::{FutureExt, SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::control::{DashboardMsg, EngineMsg};
use crate::error::ChannelError;

/// Accepting side of the control channel.
pub struct ControlListener {
    listener: TcpListener,
    local_url: String,
}

impl ControlListener {
    /// Bind to `addr` (e.g. `"127.0.0.1:6000"`, port 0 for ephemeral).
    pub async fn bind(addr: &str) -> Result<Self, ChannelError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ChannelError::BindFailed(e.to_string()))?;
        let local_url = listener
            .local_addr()
            .map(|a| format!("ws://{}", a))
            .map_err(|e| ChannelError::BindFailed(e.to_string()))?;
        Ok(Self {
            listener,
            local_url,
        })
    }

    /// The `ws://` URL an engine should connect to. Useful with port 0.
    pub fn local_url(&self) -> &str {
        &self.local_url
    }

    /// Accept the engine's connection and complete the handshake.
    pub async fn accept(&self) -> Result<ControlPeer, ChannelError> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| ChannelError::AcceptFailed(e.to_string()))?;
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| ChannelError::AcceptFailed(e.to_string()))?;
        Ok(ControlPeer { ws })
    }
}

/// One accepted engine connection.
pub struct ControlPeer {
    ws: WebSocketStream<TcpStream>,
}

impl ControlPeer {
    /// Send a command to the engine.
    pub async fn send(&mut self, msg: DashboardMsg) -> Result<(), ChannelError> {
        let json = serde_json::to_string(&msg).map_err(|e| ChannelError::SendFailed(e.to_string()))?;
        self.ws
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }

    /// Wait for the next status notification. `None` when the engine went
    /// away.
    pub async fn recv(&mut self) -> Option<EngineMsg> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    let text_str: &str = text.as_ref();
                    match serde_json::from_str::<EngineMsg>(text_str) {
                        Ok(msg) => return Some(msg),
                        Err(e) => {
                            tracing::warn!("undecodable status message: {} — raw: {}", e, text_str);
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = self.ws.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(_)) => {}
                Some(Err(_)) => return None,
            }
        }
    }

    /// The next already-arrived status notification, if any. Never blocks.
    pub fn poll_status(&mut self) -> Option<EngineMsg> {
        loop {
            match self.ws.next().now_or_never() {
                Some(Some(Ok(Message::Text(text)))) => {
                    let text_str: &str = text.as_ref();
                    if let Ok(msg) = serde_json::from_str::<EngineMsg>(text_str) {
                        return Some(msg);
                    }
                }
                // Skip non-text frames that were already buffered.
                Some(Some(Ok(_))) => {}
                _ => return None,
            }
        }
    }

    /// Close the connection gracefully.
    pub async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}
