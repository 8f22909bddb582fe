//! Viewer-side recording window and rolling chart history.
//!
//! [`SessionRecorder`] buffers scalar samples for a bounded duration and
//! computes window statistics on demand. It never reads the clock on its own
//! while recording; the owner passes `now` and is responsible for calling
//! [`SessionRecorder::stop`] once [`SessionRecorder::is_expired`] turns true.

use std::collections::VecDeque;
use std::time::Duration;

use crate::models::{PercentStats, ScalarSample, StatsReport, ThroughputStats, round1};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CHART_POINTS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecorderError {
    #[error("no samples recorded in the current window")]
    NoSamples,
}

#[derive(Debug, Clone)]
pub struct SessionRecorder {
    duration_limit_millis: i64,
    started_at: Option<i64>,
    active: bool,
    samples: Vec<ScalarSample>,
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SessionRecorder {
    pub fn new(duration_limit: Duration) -> Self {
        Self {
            duration_limit_millis: duration_limit.as_millis().min(i64::MAX as u128) as i64,
            started_at: None,
            active: false,
            samples: Vec::new(),
        }
    }

    pub fn duration_limit_millis(&self) -> i64 {
        self.duration_limit_millis
    }

    /// Starts a new window at wall-clock now.
    pub fn start(&mut self) {
        self.start_at(chrono::Utc::now().timestamp_millis());
    }

    /// Discards the previous window and starts a new one at `now_millis`.
    pub fn start_at(&mut self, now_millis: i64) {
        self.samples.clear();
        self.started_at = Some(now_millis);
        self.active = true;
    }

    /// Freezes the window. Idempotent.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    /// Appends while active; otherwise a no-op. Returns whether it was kept.
    pub fn record(&mut self, sample: ScalarSample) -> bool {
        if !self.active {
            return false;
        }
        self.samples.push(sample);
        true
    }

    pub fn samples(&self) -> &[ScalarSample] {
        &self.samples
    }

    pub fn elapsed_millis(&self, now_millis: i64) -> i64 {
        self.started_at
            .map(|start| now_millis.saturating_sub(start).max(0))
            .unwrap_or(0)
    }

    /// Window progress in percent, capped at 100.
    pub fn progress_percent(&self, now_millis: i64) -> f64 {
        if self.duration_limit_millis <= 0 {
            return 100.0;
        }
        (self.elapsed_millis(now_millis) as f64 / self.duration_limit_millis as f64 * 100.0)
            .min(100.0)
    }

    /// True once an active window has run for its full duration.
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.active && self.elapsed_millis(now_millis) >= self.duration_limit_millis
    }

    pub fn statistics(&self) -> Result<StatsReport, RecorderError> {
        let (first, last) = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(RecorderError::NoSamples),
        };
        let count = self.samples.len() as f64;

        let cpu = percent_stats(self.samples.iter().map(|s| s.cpu_percent), count);
        let memory = percent_stats(self.samples.iter().map(|s| s.memory_percent), count);

        Ok(StatsReport {
            sample_count: self.samples.len(),
            started_at: self.started_at.unwrap_or(first.timestamp_millis),
            ended_at: last.timestamp_millis,
            cpu,
            memory,
            network_rx: throughput_stats(self.samples.iter().map(|s| s.net_rx_bps), count),
            network_tx: throughput_stats(self.samples.iter().map(|s| s.net_tx_bps), count),
            disk_read: throughput_stats(self.samples.iter().map(|s| s.disk_read_bps), count),
            disk_write: throughput_stats(self.samples.iter().map(|s| s.disk_write_bps), count),
        })
    }
}

fn percent_stats(values: impl Iterator<Item = f64>, count: f64) -> PercentStats {
    let (sum, max, min) = values.fold(
        (0.0, f64::NEG_INFINITY, f64::INFINITY),
        |(sum, max, min), v| (sum + v, max.max(v), min.min(v)),
    );
    PercentStats {
        avg: round1(sum / count),
        max,
        min,
    }
}

fn throughput_stats(values: impl Iterator<Item = u64>, count: f64) -> ThroughputStats {
    let (sum, max) = values.fold((0.0, 0u64), |(sum, max), v| (sum + v as f64, max.max(v)));
    ThroughputStats {
        avg: sum / count,
        max,
    }
}

/// Fixed-length rolling series for the live charts; oldest point evicted first.
#[derive(Debug, Clone)]
pub struct ChartHistory {
    points: VecDeque<ScalarSample>,
    cap: usize,
}

impl Default for ChartHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_POINTS)
    }
}

impl ChartHistory {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            points: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, sample: ScalarSample) {
        if self.points.len() == self.cap {
            self.points.pop_front();
        }
        self.points.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScalarSample> {
        self.points.iter()
    }

    pub fn cpu_series(&self) -> Vec<f64> {
        self.points.iter().map(|s| s.cpu_percent).collect()
    }

    pub fn memory_series(&self) -> Vec<f64> {
        self.points.iter().map(|s| s.memory_percent).collect()
    }
}
