// CPU, memory, system identity and the assembled snapshot

use serde::{Deserialize, Serialize};

use super::{DiskStats, GpuStat, NetworkStats, ProcessStats};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreLoad {
    pub core: u32,
    pub load: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub usage_percent: f64,
    pub core_loads: Vec<CoreLoad>,
    pub temperature: Option<f64>,
    pub temperature_max: Option<f64>,
    pub brand: String,
    pub speed_ghz: f64,
    pub physical_cores: u32,
    pub cores: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub available: u64,
    pub usage_percent: f64,
    pub swap_total: u64,
    pub swap_used: u64,
    pub swap_percent: f64,
}

/// Platform identity plus uptime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub platform: String,
    pub distro: String,
    pub release: String,
    pub hostname: String,
    pub uptime_secs: u64,
    pub timezone: String,
}

/// One sampling instant across every metric family. Built once per cycle and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: i64,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    pub network: NetworkStats,
    pub gpu: Option<Vec<GpuStat>>,
    pub system: SystemStats,
    pub processes: Option<ProcessStats>,
}
