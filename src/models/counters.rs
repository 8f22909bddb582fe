// Cumulative OS counters and the rates derived from them

use serde::{Deserialize, Serialize};

/// One reading of cumulative byte counters. Disk readings fill the read/write
/// pair, network readings the rx/tx pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSnapshot {
    pub captured_at_millis: i64,
    pub cumulative_read_bytes: u64,
    pub cumulative_write_bytes: u64,
    pub cumulative_rx_bytes: u64,
    pub cumulative_tx_bytes: u64,
}

impl CounterSnapshot {
    pub fn disk(captured_at_millis: i64, read_bytes: u64, write_bytes: u64) -> Self {
        Self {
            captured_at_millis,
            cumulative_read_bytes: read_bytes,
            cumulative_write_bytes: write_bytes,
            ..Self::default()
        }
    }

    pub fn network(captured_at_millis: i64, rx_bytes: u64, tx_bytes: u64) -> Self {
        Self {
            captured_at_millis,
            cumulative_rx_bytes: rx_bytes,
            cumulative_tx_bytes: tx_bytes,
            ..Self::default()
        }
    }
}

/// Bytes per second; always non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rates {
    pub read_bps: u64,
    pub write_bps: u64,
    pub rx_bps: u64,
    pub tx_bps: u64,
}
