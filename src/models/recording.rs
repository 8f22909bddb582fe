// Viewer-side recording models: per-sample scalars and window statistics

use serde::{Deserialize, Serialize};

use super::Snapshot;

/// The scalar view of one snapshot kept by the recorder and the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarSample {
    pub timestamp_millis: i64,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub net_rx_bps: u64,
    pub net_tx_bps: u64,
    pub disk_read_bps: u64,
    pub disk_write_bps: u64,
}

impl From<&Snapshot> for ScalarSample {
    fn from(s: &Snapshot) -> Self {
        Self {
            timestamp_millis: s.timestamp,
            cpu_percent: s.cpu.usage_percent,
            memory_percent: s.memory.usage_percent,
            net_rx_bps: s.network.total.rx_bps,
            net_tx_bps: s.network.total.tx_bps,
            disk_read_bps: s.disk.io.read_bps,
            disk_write_bps: s.disk.io.write_bps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentStats {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

/// Throughput has no minimum: an idle minimum is not reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputStats {
    pub avg: f64,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub sample_count: usize,
    pub started_at: i64,
    pub ended_at: i64,
    pub cpu: PercentStats,
    pub memory: PercentStats,
    pub network_rx: ThroughputStats,
    pub network_tx: ThroughputStats,
    pub disk_read: ThroughputStats,
    pub disk_write: ThroughputStats,
}
