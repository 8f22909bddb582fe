// WebSocket handler: one StreamSession per connection, forwarded frame by frame

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior, interval, timeout};

use super::AppState;
use crate::config::StreamingConfig;
use crate::models::ServerMessage;
use crate::registry::SessionRegistry;
use crate::session::SessionId;

/// Registry entry owned by one socket; released once the socket loop returns.
struct SessionGuard {
    registry: Arc<SessionRegistry>,
    id: SessionId,
}

impl SessionGuard {
    async fn release(self) {
        self.registry.disconnect(self.id).await;
    }
}

pub(super) async fn ws_metrics(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let registry = state.registry.clone();
    let streaming = state.config.streaming.clone();
    ws.on_upgrade(move |socket| async move {
        let (tx, rx) = mpsc::channel::<ServerMessage>(streaming.outbox_capacity.max(1));
        let guard = SessionGuard {
            id: registry.connect(tx),
            registry,
        };
        tracing::info!(session_id = %guard.id, "Client connected to metrics stream");
        if let Err(e) = stream_metrics(socket, rx, &streaming).await {
            tracing::info!(session_id = %guard.id, "Metrics stream error: {}", e);
        }
        guard.release().await;
    })
}

async fn send_text(socket: &mut WebSocket, json: String, send_timeout: Duration) -> bool {
    matches!(
        timeout(send_timeout, socket.send(Message::Text(json.into()))).await,
        Ok(Ok(()))
    )
}

async fn stream_metrics(
    mut socket: WebSocket,
    mut rx: mpsc::Receiver<ServerMessage>,
    streaming: &StreamingConfig,
) -> anyhow::Result<()> {
    let send_timeout = Duration::from_secs(streaming.send_timeout_secs);
    let mut ping_interval = interval(Duration::from_secs(streaming.ping_interval_secs));
    ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ping_interval.tick().await;

    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else { break };
                let json = serde_json::to_string(&message)?;
                if !send_text(&mut socket, json, send_timeout).await {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(send_timeout, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "WebSocket receive failed");
                        break;
                    }
                    // Viewers send nothing meaningful; pongs and stray frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    Ok(())
}
