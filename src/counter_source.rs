// Raw OS/hardware readings, one capability per metric family.
// Every read may fail on its own; "no data" is Ok(None), never an error.

use async_trait::async_trait;

use crate::models::CounterSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct RawCpu {
    pub load_percent: f64,
    pub core_loads: Vec<f64>,
    pub temperature: Option<f64>,
    pub temperature_max: Option<f64>,
    pub brand: String,
    pub speed_ghz: f64,
    pub physical_cores: u32,
    pub logical_cores: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawFilesystem {
    pub mount: String,
    pub fs_type: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    pub use_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawInterface {
    pub name: String,
    pub is_up: bool,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Per-interface cumulative counters captured at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNetwork {
    pub captured_at_millis: i64,
    pub interfaces: Vec<RawInterface>,
}

impl RawInterface {
    pub fn counters(&self, captured_at_millis: i64) -> CounterSnapshot {
        CounterSnapshot::network(captured_at_millis, self.rx_bytes, self.tx_bytes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawGpu {
    pub model: String,
    pub vendor: String,
    pub vram_mb: Option<u64>,
    pub temperature: Option<f64>,
    pub utilization: Option<f64>,
    pub memory_used: Option<u64>,
    pub memory_total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSystem {
    pub platform: String,
    pub distro: String,
    pub release: String,
    pub hostname: String,
    pub uptime_secs: u64,
    pub timezone: String,
}

/// `name` is None when the OS could not report one; `cpu`/`mem` are percents
/// and may be negative when the source could not compute them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProcess {
    pub pid: u32,
    pub name: Option<String>,
    pub cpu: f64,
    pub mem: f64,
    pub mem_rss: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawProcessList {
    pub all: u32,
    pub running: u32,
    pub blocked: u32,
    pub sleeping: u32,
    pub list: Vec<RawProcess>,
}

/// Capability set over the host. Implementations must tolerate concurrent
/// reads from many sessions.
#[async_trait]
pub trait CounterSource: Send + Sync {
    async fn read_cpu(&self) -> anyhow::Result<RawCpu>;

    async fn read_memory(&self) -> anyhow::Result<RawMemory>;

    async fn read_disk_usage(&self) -> anyhow::Result<Vec<RawFilesystem>>;

    /// Aggregate read/write counters over all disks; None when the platform
    /// exposes none.
    async fn read_disk_io(&self) -> anyhow::Result<Option<CounterSnapshot>>;

    async fn read_network(&self) -> anyhow::Result<RawNetwork>;

    /// None when GPU reporting is unsupported on this host.
    async fn read_gpu(&self) -> anyhow::Result<Option<Vec<RawGpu>>>;

    async fn read_processes(&self) -> anyhow::Result<RawProcessList>;

    async fn read_system(&self) -> anyhow::Result<RawSystem>;
}
