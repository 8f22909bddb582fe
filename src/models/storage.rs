// Filesystem usage and disk I/O models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemStat {
    pub mount: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskIo {
    pub read_bps: u64,
    pub write_bps: u64,
    pub total_read: u64,
    pub total_write: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskStats {
    pub disks: Vec<FilesystemStat>,
    pub io: DiskIo,
}
