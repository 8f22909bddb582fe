// Rates from cumulative counters: pure function of (previous, current).

use std::collections::HashMap;

use crate::models::{CounterSnapshot, Rates};

/// Derives bytes/sec from two counter readings.
///
/// Returns all zeros when there is no previous reading or when the elapsed
/// time is not positive. A counter that went backwards (wrap or source
/// restart) yields zero for that counter.
pub fn compute_rates(previous: Option<&CounterSnapshot>, current: &CounterSnapshot) -> Rates {
    let Some(previous) = previous else {
        return Rates::default();
    };
    let elapsed_ms = current
        .captured_at_millis
        .saturating_sub(previous.captured_at_millis);
    if elapsed_ms <= 0 {
        return Rates::default();
    }
    let elapsed_secs = elapsed_ms as f64 / 1000.0;

    Rates {
        read_bps: per_second(
            previous.cumulative_read_bytes,
            current.cumulative_read_bytes,
            elapsed_secs,
        ),
        write_bps: per_second(
            previous.cumulative_write_bytes,
            current.cumulative_write_bytes,
            elapsed_secs,
        ),
        rx_bps: per_second(
            previous.cumulative_rx_bytes,
            current.cumulative_rx_bytes,
            elapsed_secs,
        ),
        tx_bps: per_second(
            previous.cumulative_tx_bytes,
            current.cumulative_tx_bytes,
            elapsed_secs,
        ),
    }
}

fn per_second(previous: u64, current: u64, elapsed_secs: f64) -> u64 {
    let delta = current.saturating_sub(previous);
    (delta as f64 / elapsed_secs).round().max(0.0) as u64
}

/// Last disk and per-interface network readings of one assembler.
/// Absent on the first cycle; replaced on every cycle that read counters.
#[derive(Debug, Default)]
pub struct RateState {
    disk: Option<CounterSnapshot>,
    network: HashMap<String, CounterSnapshot>,
}

impl RateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the disk rate against the stored baseline and stores `current`
    /// unconditionally.
    pub fn advance_disk(&mut self, current: CounterSnapshot) -> Rates {
        let rates = compute_rates(self.disk.as_ref(), &current);
        self.disk = Some(current);
        rates
    }

    /// Computes one rate per interface reading and replaces the whole network
    /// baseline with this reading, dropping interfaces that disappeared.
    pub fn advance_network<'a, I>(&mut self, readings: I) -> Vec<Rates>
    where
        I: IntoIterator<Item = (&'a str, CounterSnapshot)>,
    {
        let mut next = HashMap::new();
        let rates = readings
            .into_iter()
            .map(|(name, current)| {
                let rates = compute_rates(self.network.get(name), &current);
                next.insert(name.to_string(), current);
                rates
            })
            .collect();
        self.network = next;
        rates
    }

    pub fn disk_baseline(&self) -> Option<&CounterSnapshot> {
        self.disk.as_ref()
    }

    pub fn interface_baseline(&self, name: &str) -> Option<&CounterSnapshot> {
        self.network.get(name)
    }

    pub fn clear(&mut self) {
        self.disk = None;
        self.network.clear();
    }
}
