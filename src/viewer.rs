// Transport-agnostic viewer model: latest snapshot, chart history, recording window.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::RecorderConfig;
use crate::models::{ScalarSample, ServerMessage, Snapshot, StatsReport};
use crate::recorder::{ChartHistory, RecorderError, SessionRecorder};

pub struct ViewerState {
    latest: Option<Snapshot>,
    last_error: Option<String>,
    history: ChartHistory,
    recorder: SessionRecorder,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(&RecorderConfig::default())
    }
}

impl ViewerState {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            latest: None,
            last_error: None,
            history: ChartHistory::new(config.chart_points),
            recorder: SessionRecorder::new(Duration::from_secs(config.duration_secs)),
        }
    }

    /// Applies one message from the server. Snapshots feed the charts and,
    /// while recording, the recorder; the window is closed first if it
    /// already ran out.
    pub fn handle(&mut self, message: ServerMessage, now_millis: i64) {
        self.tick(now_millis);
        match message {
            ServerMessage::Metrics(snapshot) => {
                let sample = ScalarSample::from(snapshot.as_ref());
                self.history.push(sample);
                if self.recorder.record(sample) {
                    debug!(samples = self.recorder.samples().len(), "sample recorded");
                }
                self.last_error = None;
                self.latest = Some(*snapshot);
            }
            ServerMessage::Error { message } => {
                warn!(%message, "server reported a failed cycle");
                self.last_error = Some(message);
            }
        }
    }

    /// External-timer duty: stops the recorder once its window elapsed.
    /// Returns true when this call stopped it.
    pub fn tick(&mut self, now_millis: i64) -> bool {
        if self.recorder.is_expired(now_millis) {
            self.recorder.stop();
            info!(
                samples = self.recorder.samples().len(),
                "recording window complete"
            );
            return true;
        }
        false
    }

    pub fn start_recording(&mut self, now_millis: i64) {
        self.recorder.start_at(now_millis);
        info!(
            duration_ms = self.recorder.duration_limit_millis(),
            "recording started"
        );
    }

    pub fn stop_recording(&mut self) {
        self.recorder.stop();
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_active()
    }

    pub fn report(&self) -> Result<StatsReport, RecorderError> {
        self.recorder.statistics()
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn history(&self) -> &ChartHistory {
        &self.history
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
