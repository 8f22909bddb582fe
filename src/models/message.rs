// Outbound messages, one per cycle, point-to-point to a single viewer

use serde::{Deserialize, Serialize};

use super::Snapshot;

/// `metrics` carries a full snapshot; `error` is sent only after a cycle
/// exhausted its retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Metrics(Box<Snapshot>),
    Error { message: String },
}

impl ServerMessage {
    pub fn is_metrics(&self) -> bool {
        matches!(self, ServerMessage::Metrics(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ServerMessage::Error { .. })
    }
}
