// Domain models: snapshot families, raw counters, recording window

mod counters;
mod gpu;
mod message;
mod network;
mod process;
mod recording;
mod storage;
mod system;

pub use counters::{CounterSnapshot, Rates};
pub use gpu::GpuStat;
pub use message::ServerMessage;
pub use network::{InterfaceStat, NetworkStats, NetworkTotals};
pub use process::{ProcessEntry, ProcessStats};
pub use recording::{PercentStats, ScalarSample, StatsReport, ThroughputStats};
pub use storage::{DiskIo, DiskStats, FilesystemStat};
pub use system::{CoreLoad, CpuStats, MemoryStats, Snapshot, SystemStats};

/// Rounds a percentage to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
