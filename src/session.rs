// Per-viewer streaming session: cadence timer, bounded retry, point-to-point delivery.
// Connecting -> Streaming -> (Retrying)* -> Streaming | Terminated

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assembler::{DEFAULT_TOP_N, SnapshotAssembler};
use crate::models::ServerMessage;
use crate::retry::RetryPolicy;

pub type SessionId = Uuid;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Streaming,
    Retrying,
    Terminated,
}

/// Server-side bookkeeping for one viewer.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
    pub consecutive_failures: u32,
    pub cycles: u64,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            state: SessionState::Connecting,
            consecutive_failures: 0,
            cycles: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Start-to-start spacing of cycles.
    pub interval: Duration,
    pub retry: RetryPolicy,
    pub top_n: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            retry: RetryPolicy::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

pub struct StreamSession {
    session: Session,
    assembler: SnapshotAssembler,
    config: StreamConfig,
    outbox: mpsc::Sender<ServerMessage>,
}

/// Owner side of a running session. Dropping it without calling
/// [`disconnect`](Self::disconnect) also terminates the session.
pub struct SessionHandle {
    id: SessionId,
    created_at: DateTime<Utc>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Session>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the timer and any pending retry, then waits for the task so no
    /// delivery can happen after this returns.
    pub async fn disconnect(self) -> Option<Session> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "session task join failed");
                None
            }
        }
    }
}

impl StreamSession {
    pub fn new(
        id: SessionId,
        assembler: SnapshotAssembler,
        config: StreamConfig,
        outbox: mpsc::Sender<ServerMessage>,
    ) -> Self {
        Self {
            session: Session::new(id),
            assembler,
            config,
            outbox,
        }
    }

    pub fn spawn(self) -> SessionHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let id = self.session.id;
        let created_at = self.session.created_at;
        let task = tokio::spawn(self.run(shutdown_rx));
        SessionHandle {
            id,
            created_at,
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Runs until shutdown fires (or its sender is dropped) or the viewer's
    /// receiving end goes away. Cycles never overlap: a tick missed while a
    /// cycle overruns is skipped.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> Session {
        let id = self.session.id;
        self.session.state = SessionState::Streaming;
        info!(session_id = %id, interval_ms = self.config.interval.as_millis() as u64, "session streaming");

        let mut tick = interval(self.config.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tick.tick() => {}
            }
            let message = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                message = self.cycle() => message,
            };
            let sent = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                sent = self.outbox.send(message) => sent,
            };
            if sent.is_err() {
                debug!(session_id = %id, "viewer outbox closed");
                break;
            }
        }

        self.session.state = SessionState::Terminated;
        info!(
            session_id = %id,
            cycles = self.session.cycles,
            consecutive_failures = self.session.consecutive_failures,
            "session terminated"
        );
        self.session
    }

    /// One cycle: assemble with bounded retry. Yields either a snapshot or the
    /// error notification for this cycle.
    async fn cycle(&mut self) -> ServerMessage {
        self.session.cycles += 1;
        let mut attempt = 1;
        loop {
            match self.assembler.assemble().await {
                Ok(snapshot) => {
                    self.session.consecutive_failures = 0;
                    self.session.state = SessionState::Streaming;
                    return ServerMessage::Metrics(Box::new(snapshot));
                }
                Err(e) => {
                    warn!(
                        session_id = %self.session.id,
                        attempt,
                        error = %e,
                        operation = "assemble",
                        "snapshot assembly failed"
                    );
                    match self.config.retry.delay_after(attempt) {
                        Some(delay) => {
                            self.session.state = SessionState::Retrying;
                            sleep(delay).await;
                            attempt += 1;
                        }
                        None => {
                            self.session.consecutive_failures += 1;
                            self.session.state = SessionState::Streaming;
                            warn!(
                                session_id = %self.session.id,
                                consecutive_failures = self.session.consecutive_failures,
                                "cycle exhausted retries"
                            );
                            return ServerMessage::Error {
                                message: format!("failed to collect metrics: {e}"),
                            };
                        }
                    }
                }
            }
        }
    }
}
