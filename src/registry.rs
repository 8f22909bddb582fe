// Session registry: insert on connect, remove on disconnect. Owned by the router state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::assembler::SnapshotAssembler;
use crate::counter_source::CounterSource;
use crate::models::ServerMessage;
use crate::session::{Session, SessionHandle, SessionId, StreamConfig, StreamSession};

pub struct SessionRegistry {
    source: Arc<dyn CounterSource>,
    config: StreamConfig,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(source: Arc<dyn CounterSource>, config: StreamConfig) -> Self {
        Self {
            source,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a session with its own assembler (and so its own rate baseline).
    /// The first cycle runs immediately.
    pub fn connect(&self, outbox: mpsc::Sender<ServerMessage>) -> SessionId {
        let id = Uuid::new_v4();
        let assembler = SnapshotAssembler::with_top_n(self.source.clone(), self.config.top_n);
        let handle = StreamSession::new(id, assembler, self.config, outbox).spawn();
        let active_sessions = {
            let mut sessions = self.sessions();
            sessions.insert(id, handle);
            sessions.len()
        };
        info!(session_id = %id, active_sessions, "viewer connected");
        id
    }

    /// Terminates and forgets a session. Returns its final state, or None if
    /// the id is unknown (already disconnected).
    pub async fn disconnect(&self, id: SessionId) -> Option<Session> {
        let handle = self.sessions().remove(&id)?;
        let session = handle.disconnect().await;
        info!(session_id = %id, active_sessions = self.len(), "viewer disconnected");
        session
    }

    pub async fn shutdown_all(&self) {
        let handles: Vec<SessionHandle> = self.sessions().drain().map(|(_, h)| h).collect();
        let n = handles.len();
        join_all(handles.into_iter().map(SessionHandle::disconnect)).await;
        info!(sessions = n, "all sessions terminated");
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions().contains_key(&id)
    }

    /// Active session ids with their connect time, oldest first.
    pub fn list(&self) -> Vec<(SessionId, DateTime<Utc>)> {
        let mut out: Vec<(SessionId, DateTime<Utc>)> = self
            .sessions()
            .values()
            .map(|h| (h.id(), h.created_at()))
            .collect();
        out.sort_by_key(|(_, created_at)| *created_at);
        out
    }
}
