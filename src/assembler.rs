// Snapshot assembly: concurrent family reads merged into one immutable Snapshot.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::counter_source::{
    CounterSource, RawCpu, RawFilesystem, RawGpu, RawMemory, RawNetwork, RawProcess,
    RawProcessList, RawSystem,
};
use crate::models::{
    CoreLoad, CounterSnapshot, CpuStats, DiskIo, DiskStats, FilesystemStat, GpuStat,
    InterfaceStat, MemoryStats, NetworkStats, NetworkTotals, ProcessEntry, ProcessStats,
    Snapshot, SystemStats, round1,
};
use crate::rate::RateState;

pub const DEFAULT_TOP_N: usize = 10;

/// Families whose failure fails the whole assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFamily {
    Cpu,
    Memory,
    Disk,
    Network,
    System,
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricFamily::Cpu => "cpu",
            MetricFamily::Memory => "memory",
            MetricFamily::Disk => "disk",
            MetricFamily::Network => "network",
            MetricFamily::System => "system",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("{family} read failed: {source:#}")]
    Family {
        family: MetricFamily,
        #[source]
        source: anyhow::Error,
    },
}

impl AssembleError {
    pub fn family(&self) -> MetricFamily {
        match self {
            AssembleError::Family { family, .. } => *family,
        }
    }
}

fn essential<T>(family: MetricFamily, result: anyhow::Result<T>) -> Result<T, AssembleError> {
    result.map_err(|source| AssembleError::Family { family, source })
}

/// Owns one RateState; one assembler per session.
pub struct SnapshotAssembler {
    source: Arc<dyn CounterSource>,
    rates: RateState,
    top_n: usize,
}

impl SnapshotAssembler {
    pub fn new(source: Arc<dyn CounterSource>) -> Self {
        Self::with_top_n(source, DEFAULT_TOP_N)
    }

    pub fn with_top_n(source: Arc<dyn CounterSource>, top_n: usize) -> Self {
        Self {
            source,
            rates: RateState::new(),
            top_n,
        }
    }

    pub fn rate_state(&self) -> &RateState {
        &self.rates
    }

    /// Reads every family concurrently and builds one Snapshot.
    ///
    /// Counter baselines are advanced before any essential failure is
    /// reported, so a failed cycle never leaves a stale baseline behind.
    pub async fn assemble(&mut self) -> Result<Snapshot, AssembleError> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let source = self.source.as_ref();

        let (cpu, memory, disk_usage, disk_io, network, gpu, system, processes) = tokio::join!(
            source.read_cpu(),
            source.read_memory(),
            source.read_disk_usage(),
            source.read_disk_io(),
            source.read_network(),
            source.read_gpu(),
            source.read_system(),
            source.read_processes(),
        );

        let disk_io = disk_io.map(|counters| self.disk_io(counters));
        let network = network.map(|raw| self.network(raw));

        let gpu = degraded("read_gpu", gpu).flatten().and_then(build_gpu);
        let processes = degraded("read_processes", processes)
            .map(|list| build_processes(list, self.top_n));

        let cpu = build_cpu(essential(MetricFamily::Cpu, cpu)?);
        let memory = build_memory(essential(MetricFamily::Memory, memory)?);
        let disks = build_filesystems(essential(MetricFamily::Disk, disk_usage)?);
        let io = essential(MetricFamily::Disk, disk_io)?;
        let network = essential(MetricFamily::Network, network)?;
        let system = build_system(essential(MetricFamily::System, system)?);

        Ok(Snapshot {
            timestamp,
            cpu,
            memory,
            disk: DiskStats { disks, io },
            network,
            gpu,
            system,
            processes,
        })
    }

    fn disk_io(&mut self, counters: Option<CounterSnapshot>) -> DiskIo {
        let Some(current) = counters else {
            return DiskIo::default();
        };
        let rates = self.rates.advance_disk(current);
        DiskIo {
            read_bps: rates.read_bps,
            write_bps: rates.write_bps,
            total_read: current.cumulative_read_bytes,
            total_write: current.cumulative_write_bytes,
        }
    }

    fn network(&mut self, raw: RawNetwork) -> NetworkStats {
        let captured_at = raw.captured_at_millis;
        let rates = self.rates.advance_network(
            raw.interfaces
                .iter()
                .map(|i| (i.name.as_str(), i.counters(captured_at))),
        );

        let interfaces: Vec<InterfaceStat> = raw
            .interfaces
            .into_iter()
            .zip(rates)
            .filter(|(iface, _)| iface.is_up || iface.rx_bytes > 0 || iface.tx_bytes > 0)
            .map(|(iface, rates)| InterfaceStat {
                name: iface.name,
                rx_bps: rates.rx_bps,
                tx_bps: rates.tx_bps,
                rx_total: iface.rx_bytes,
                tx_total: iface.tx_bytes,
            })
            .collect();

        let total = interfaces
            .iter()
            .fold(NetworkTotals::default(), |acc, i| NetworkTotals {
                rx_bps: acc.rx_bps.saturating_add(i.rx_bps),
                tx_bps: acc.tx_bps.saturating_add(i.tx_bps),
                rx_total: acc.rx_total.saturating_add(i.rx_total),
                tx_total: acc.tx_total.saturating_add(i.tx_total),
            });

        NetworkStats { interfaces, total }
    }
}

fn degraded<T>(operation: &'static str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, operation, "degraded family unavailable");
            None
        }
    }
}

fn build_cpu(raw: RawCpu) -> CpuStats {
    CpuStats {
        usage_percent: round1(raw.load_percent),
        core_loads: raw
            .core_loads
            .iter()
            .enumerate()
            .map(|(core, load)| CoreLoad {
                core: core as u32,
                load: round1(*load),
            })
            .collect(),
        temperature: raw.temperature.filter(|t| *t > 0.0),
        temperature_max: raw.temperature_max.filter(|t| *t > 0.0),
        brand: raw.brand,
        speed_ghz: raw.speed_ghz,
        physical_cores: raw.physical_cores,
        cores: raw.logical_cores,
    }
}

fn build_memory(raw: RawMemory) -> MemoryStats {
    MemoryStats {
        total: raw.total,
        used: raw.used,
        free: raw.free,
        available: raw.available,
        usage_percent: percent_of(raw.used, raw.total),
        swap_total: raw.swap_total,
        swap_used: raw.swap_used,
        swap_percent: percent_of(raw.swap_used, raw.swap_total),
    }
}

fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}

fn build_filesystems(raw: Vec<RawFilesystem>) -> Vec<FilesystemStat> {
    raw.into_iter()
        .map(|fs| FilesystemStat {
            mount: fs.mount,
            type_: fs.fs_type,
            size: fs.size,
            used: fs.used,
            available: fs.available,
            usage_percent: round1(fs.use_percent),
        })
        .collect()
}

fn build_gpu(raw: Vec<RawGpu>) -> Option<Vec<GpuStat>> {
    if raw.is_empty() {
        debug!("no GPU controllers reported");
        return None;
    }
    Some(
        raw.into_iter()
            .map(|g| GpuStat {
                model: g.model,
                vendor: g.vendor,
                vram_mb: g.vram_mb,
                temperature: g.temperature,
                utilization: g.utilization,
                memory_used: g.memory_used,
                memory_total: g.memory_total,
            })
            .collect(),
    )
}

/// Also backs GET /api/info.
pub fn build_system(raw: RawSystem) -> SystemStats {
    SystemStats {
        platform: raw.platform,
        distro: raw.distro,
        release: raw.release,
        hostname: raw.hostname,
        uptime_secs: raw.uptime_secs,
        timezone: raw.timezone,
    }
}

fn build_processes(raw: RawProcessList, top_n: usize) -> ProcessStats {
    ProcessStats {
        total: raw.all,
        running: raw.running,
        blocked: raw.blocked,
        sleeping: raw.sleeping,
        top_cpu: rank_processes(&raw.list, |p| p.cpu, top_n),
        top_memory: rank_processes(&raw.list, |p| p.mem, top_n),
    }
}

/// Top `n` named processes by `key`, descending. Entries without a name or
/// with a negative key are skipped; ties keep source order.
pub fn rank_processes<F>(list: &[RawProcess], key: F, n: usize) -> Vec<ProcessEntry>
where
    F: Fn(&RawProcess) -> f64,
{
    let mut ranked: Vec<&RawProcess> = list
        .iter()
        .filter(|p| p.name.as_deref().is_some_and(|name| !name.is_empty()))
        .filter(|p| key(*p) >= 0.0)
        .collect();
    ranked.sort_by(|a, b| key(*b).partial_cmp(&key(*a)).unwrap_or(Ordering::Equal));
    ranked
        .into_iter()
        .take(n)
        .map(|p| ProcessEntry {
            pid: p.pid,
            name: p.name.clone().unwrap_or_default(),
            cpu: round1(p.cpu),
            memory: round1(p.mem),
            mem_rss: p.mem_rss,
        })
        .collect()
}
