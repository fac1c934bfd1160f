//! Engine-side control channel — the connecting endpoint.
//!
//! A background tokio task owns the WebSocket connection. The public API
//! talks to it through mpsc channels: sends are non-blocking, and incoming
//! dashboard commands are buffered so the engine can poll for them once per
//! timer tick without ever blocking on the dashboard.
//!
//! The first connection is made synchronously by [`ControlChannel::connect`]
//! so a missing dashboard fails engine startup within the handshake
//! timeout. After that, a dropped connection is reconnected in the
//! background with exponential backoff and jitter; status messages that
//! could not be delivered are queued and flushed on reconnect
//! (at-least-once delivery).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::control::{ControlConfig, DashboardMsg, EngineMsg, StatusSink};
use crate::error::ChannelError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Send(EngineMsg),
    Disconnect,
}

enum DisconnectReason {
    UserRequested,
    Dropped(String),
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    config: ControlConfig,
    msg_tx: mpsc::Sender<DashboardMsg>,
    cmd_rx: mpsc::Receiver<Command>,
    pending: Vec<EngineMsg>,
    reconnect_attempts: u32,
    connected: Arc<AtomicBool>,
}

impl TaskState {
    fn should_reconnect(&self) -> bool {
        self.config.reconnect && self.reconnect_attempts < self.config.max_reconnect_attempts
    }
}

// ─── Public ControlChannel ───────────────────────────────────────────────────

/// The engine's exclusively-owned endpoint of the control channel.
pub struct ControlChannel {
    cmd_tx: mpsc::Sender<Command>,
    msg_rx: mpsc::Receiver<DashboardMsg>,
    task_handle: Option<JoinHandle<()>>,
    connected: Arc<AtomicBool>,
}

impl ControlChannel {
    /// Connect to the dashboard endpoint.
    ///
    /// The dashboard must already be listening; the handshake is bounded by
    /// `config.connect_timeout` so a never-started dashboard surfaces as a
    /// `ChannelError` instead of a startup deadlock.
    pub async fn connect(config: ControlConfig) -> Result<Self, ChannelError> {
        let ws = attempt_connect(&config.url, config.connect_timeout).await?;
        tracing::info!(url = %config.url, "control channel established");

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (msg_tx, msg_rx) = mpsc::channel(256);
        let connected = Arc::new(AtomicBool::new(true));

        let state = TaskState {
            config,
            msg_tx,
            cmd_rx,
            pending: Vec::new(),
            reconnect_attempts: 0,
            connected: Arc::clone(&connected),
        };
        let task_handle = tokio::spawn(run_task(state, ws));

        Ok(Self {
            cmd_tx,
            msg_rx,
            task_handle: Some(task_handle),
            connected,
        })
    }

    /// Queue a status notification for the dashboard. Never blocks.
    pub fn send(&self, msg: EngineMsg) -> Result<(), ChannelError> {
        self.cmd_tx
            .try_send(Command::Send(msg))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    ChannelError::SendFailed("command queue full".into())
                }
                mpsc::error::TrySendError::Closed(_) => ChannelError::NotConnected,
            })
    }

    /// The next pending dashboard command, if any. Never blocks.
    pub fn poll_message(&mut self) -> Option<DashboardMsg> {
        self.msg_rx.try_recv().ok()
    }

    /// Whether the underlying connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Close the connection and wait briefly for the task to finish.
    pub async fn disconnect(&mut self) {
        let _ = self.cmd_tx.send(Command::Disconnect).await;
        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

impl Drop for ControlChannel {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

impl StatusSink for ControlChannel {
    fn notify(&self, msg: EngineMsg) {
        if let Err(e) = self.send(msg) {
            tracing::debug!("status notification dropped: {}", e);
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState, initial: WsStream) {
    let mut established = Some(initial);
    loop {
        // ── 1. (Re)acquire a connection ──────────────────────────────────
        let ws = match established.take() {
            Some(ws) => ws,
            None => {
                match attempt_connect(&state.config.url, state.config.connect_timeout).await {
                    Ok(ws) => ws,
                    Err(e) => {
                        tracing::warn!("control channel reconnect failed: {}", e);
                        if !state.should_reconnect() {
                            tracing::error!("control channel giving up; dashboard unreachable");
                            return;
                        }
                        backoff_sleep(&mut state).await;
                        drain_commands_to_pending(&mut state);
                        continue;
                    }
                }
            }
        };

        // ── 2. Connected: flush queued statuses ──────────────────────────
        state.reconnect_attempts = 0;
        state.connected.store(true, Ordering::SeqCst);
        let (mut sink, stream) = ws.split();
        flush_pending(&mut sink, &mut state.pending).await;

        // ── 3. Inner select! loop until the connection breaks ────────────
        let reason = run_connected(&mut state, sink, stream).await;
        state.connected.store(false, Ordering::SeqCst);

        match reason {
            DisconnectReason::UserRequested => return,
            DisconnectReason::Dropped(cause) => {
                tracing::warn!("control channel dropped: {}", cause);
                if !state.should_reconnect() {
                    tracing::error!("control channel giving up; dashboard unreachable");
                    return;
                }
                backoff_sleep(&mut state).await;
                drain_commands_to_pending(&mut state);
            }
        }
    }
}

/// The inner connected loop — runs until the connection breaks.
async fn run_connected(
    state: &mut TaskState,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) -> DisconnectReason {
    loop {
        tokio::select! {
            // ── a) Incoming dashboard command ────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        match serde_json::from_str::<DashboardMsg>(text_str) {
                            Ok(parsed) => {
                                if state.msg_tx.try_send(parsed).is_err() {
                                    tracing::warn!("control command queue full, dropping message");
                                }
                            }
                            Err(e) => {
                                tracing::warn!("undecodable control message: {} — raw: {}", e, text_str);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        return DisconnectReason::Dropped("peer closed".into());
                    }
                    Some(Ok(_)) => {} // Binary, Pong, Frame — ignore
                    Some(Err(e)) => {
                        return DisconnectReason::Dropped(e.to_string());
                    }
                    None => {
                        return DisconnectReason::Dropped("stream ended".into());
                    }
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Send(msg)) => {
                        if let Err(e) = send_msg(&mut sink, &msg).await {
                            // Keep the message for the next connection.
                            state.pending.push(msg);
                            return DisconnectReason::Dropped(e);
                        }
                    }
                    Some(Command::Disconnect) | None => {
                        let _ = sink.close().await;
                        return DisconnectReason::UserRequested;
                    }
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn attempt_connect(url: &str, timeout: Duration) -> Result<WsStream, ChannelError> {
    match tokio::time::timeout(timeout, connect_async(url)).await {
        Err(_) => Err(ChannelError::HandshakeTimeout(timeout)),
        Ok(Err(e)) => Err(ChannelError::ConnectFailed(e.to_string())),
        Ok(Ok((ws, _response))) => Ok(ws),
    }
}

async fn send_msg(sink: &mut SplitSink<WsStream, Message>, msg: &EngineMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

async fn flush_pending(sink: &mut SplitSink<WsStream, Message>, pending: &mut Vec<EngineMsg>) {
    if pending.is_empty() {
        return;
    }
    tracing::info!("flushing {} pending status message(s)", pending.len());
    let messages = std::mem::take(pending);
    for msg in &messages {
        if let Err(e) = send_msg(sink, msg).await {
            tracing::warn!("failed to flush pending status: {}", e);
        }
    }
}

/// Park any statuses queued while disconnected so they survive to the next
/// connection. A `Disconnect` command ends the task via the outer loop.
fn drain_commands_to_pending(state: &mut TaskState) {
    while let Ok(cmd) = state.cmd_rx.try_recv() {
        match cmd {
            Command::Send(msg) => state.pending.push(msg),
            Command::Disconnect => return,
        }
    }
}

// ─── Reconnection backoff ────────────────────────────────────────────────────

async fn backoff_sleep(state: &mut TaskState) {
    state.reconnect_attempts += 1;
    let delay = backoff_delay_ms(
        state.reconnect_attempts,
        state.config.base_reconnect_delay_ms,
    );
    tracing::info!(
        "control reconnect attempt {}/{} in {}ms",
        state.reconnect_attempts,
        state.config.max_reconnect_attempts,
        delay
    );
    tokio::time::sleep(Duration::from_millis(delay as u64)).await;
}

fn backoff_delay_ms(attempt: u32, base_ms: u32) -> u32 {
    let exp = (attempt - 1).min(10);
    let base = base_ms.saturating_mul(1u32 << exp);
    let jitter = rand::random::<u32>() % 500;
    base.saturating_add(jitter).min(60_000)
}
