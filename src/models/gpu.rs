// GPU controller model (degraded family: the snapshot carries null when unavailable)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuStat {
    pub model: String,
    pub vendor: String,
    pub vram_mb: Option<u64>,
    pub temperature: Option<f64>,
    pub utilization: Option<f64>,
    pub memory_used: Option<u64>,
    pub memory_total: Option<u64>,
}
