// Host counter source via sysinfo

mod linux;

use crate::counter_source::{
    CounterSource, RawCpu, RawFilesystem, RawGpu, RawInterface, RawMemory, RawNetwork,
    RawProcess, RawProcessList, RawSystem,
};
use crate::models::CounterSnapshot;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{Components, Disks, Networks, ProcessStatus, ProcessesToUpdate, System};
use tracing::instrument;

/// Last CPU refresh: when, and the loads it produced.
type CpuReading = (Instant, f64, Vec<f64>);

pub struct SysinfoSource {
    sys: Arc<std::sync::Mutex<System>>,
    disks: Arc<std::sync::Mutex<Disks>>,
    networks: Arc<std::sync::Mutex<Networks>>,
    components: Arc<std::sync::Mutex<Components>>,
    last_cpu_refresh: Arc<std::sync::Mutex<Option<CpuReading>>>,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        let components = Components::new_with_refreshed_list();
        Self {
            sys: Arc::new(std::sync::Mutex::new(sys)),
            disks: Arc::new(std::sync::Mutex::new(disks)),
            networks: Arc::new(std::sync::Mutex::new(networks)),
            components: Arc::new(std::sync::Mutex::new(components)),
            last_cpu_refresh: Arc::new(std::sync::Mutex::new(None)),
        }
    }
}

#[async_trait]
impl CounterSource for SysinfoSource {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_cpu"))]
    async fn read_cpu(&self) -> anyhow::Result<RawCpu> {
        let sys = self.sys.clone();
        let components = self.components.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;

            // Several sessions poll the same System; re-reading faster than the
            // minimum update interval would report meaningless loads.
            let now = Instant::now();
            let mut guard = last_cpu_refresh
                .lock()
                .map_err(|e| anyhow::anyhow!("cpu cache lock poisoned: {}", e))?;
            let cached = guard
                .as_ref()
                .filter(|(prev_ts, _, _)| {
                    now.duration_since(*prev_ts) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL
                })
                .map(|(_, usage, cores)| (*usage, cores.clone()));
            let (load_percent, core_loads) = match cached {
                Some(reading) => reading,
                None => {
                    sys.refresh_cpu_all();
                    let usage = (sys.global_cpu_usage() as f64).clamp(0.0, 100.0);
                    let cores: Vec<f64> =
                        sys.cpus().iter().map(|c| c.cpu_usage() as f64).collect();
                    *guard = Some((now, usage, cores.clone()));
                    (usage, cores)
                }
            };
            drop(guard);

            let brand = linux::read_cpu_model_linux()
                .or_else(|| {
                    sys.cpus()
                        .first()
                        .map(|c| c.brand().trim().to_string())
                        .filter(|s| !s.is_empty())
                })
                .unwrap_or_else(|| "Unknown".into());
            let speed_ghz = sys
                .cpus()
                .first()
                .map(|c| c.frequency() as f64 / 1000.0)
                .unwrap_or(0.0);
            let physical_cores = System::physical_core_count().unwrap_or(0) as u32;
            let logical_cores = sys.cpus().len() as u32;
            drop(sys);

            let (temperature, temperature_max) = {
                let mut components = components
                    .lock()
                    .map_err(|e| anyhow::anyhow!("sysinfo components lock poisoned: {}", e))?;
                components.refresh(false);
                let temps: Vec<f64> = components
                    .list()
                    .iter()
                    .filter(|c| {
                        let l = c.label().to_ascii_lowercase();
                        l.contains("cpu")
                            || l.contains("package")
                            || l.contains("tctl")
                            || l.contains("tdie")
                            || l.contains("core")
                    })
                    .filter_map(|c| c.temperature())
                    .map(|t| t as f64)
                    .collect();
                if temps.is_empty() {
                    (None, None)
                } else {
                    let main = temps.iter().sum::<f64>() / temps.len() as f64;
                    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    (Some(main), Some(max))
                }
            };

            Ok(RawCpu {
                load_percent,
                core_loads,
                temperature,
                temperature_max,
                brand,
                speed_ghz,
                physical_cores,
                logical_cores,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_memory"))]
    async fn read_memory(&self) -> anyhow::Result<RawMemory> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();

            let total = sys.total_memory();
            let available = sys.available_memory();
            Ok(RawMemory {
                total,
                used: total.saturating_sub(available),
                free: sys.free_memory(),
                available,
                swap_total: sys.total_swap(),
                swap_used: sys.used_swap(),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_disk_usage"))]
    async fn read_disk_usage(&self) -> anyhow::Result<Vec<RawFilesystem>> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks_guard = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks_guard.refresh(false);
            Ok(disks_guard
                .list()
                .iter()
                .map(|d| {
                    let size = d.total_space();
                    let available = d.available_space();
                    let used = size.saturating_sub(available);
                    let use_percent = if size > 0 {
                        (used as f64 / size as f64) * 100.0
                    } else {
                        0.0
                    };
                    RawFilesystem {
                        mount: d.mount_point().to_string_lossy().into_owned(),
                        fs_type: d.file_system().to_string_lossy().into_owned(),
                        size,
                        used,
                        available,
                        use_percent,
                    }
                })
                .collect())
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_disk_io"))]
    async fn read_disk_io(&self) -> anyhow::Result<Option<CounterSnapshot>> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks_guard = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks_guard.refresh(false);
            if disks_guard.list().is_empty() {
                return Ok(None);
            }
            let (read, written) = disks_guard.list().iter().fold((0u64, 0u64), |acc, d| {
                let usage = d.usage();
                (
                    acc.0.saturating_add(usage.total_read_bytes),
                    acc.1.saturating_add(usage.total_written_bytes),
                )
            });
            Ok(Some(CounterSnapshot::disk(now_millis(), read, written)))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_network"))]
    async fn read_network(&self) -> anyhow::Result<RawNetwork> {
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || {
            let mut networks_guard = networks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
            networks_guard.refresh(true);
            let captured_at_millis = now_millis();
            let mut interfaces: Vec<RawInterface> = networks_guard
                .list()
                .iter()
                .map(|(name, data)| RawInterface {
                    name: name.clone(),
                    is_up: linux::interface_is_up(name),
                    rx_bytes: data.total_received(),
                    tx_bytes: data.total_transmitted(),
                })
                .collect();
            interfaces.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(RawNetwork {
                captured_at_millis,
                interfaces,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_gpu"))]
    async fn read_gpu(&self) -> anyhow::Result<Option<Vec<RawGpu>>> {
        tokio::task::spawn_blocking(linux::read_drm_gpus)
            .await
            .map_err(|e| anyhow::anyhow!("gpu task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_processes"))]
    async fn read_processes(&self) -> anyhow::Result<RawProcessList> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);

            let total_memory = sys.total_memory();
            let cores = sys.cpus().len().max(1) as f64;
            let (mut running, mut blocked, mut sleeping) = (0u32, 0u32, 0u32);
            let mut list: Vec<RawProcess> = sys
                .processes()
                .values()
                .map(|p| {
                    match p.status() {
                        ProcessStatus::Run => running += 1,
                        ProcessStatus::UninterruptibleDiskSleep => blocked += 1,
                        ProcessStatus::Sleep | ProcessStatus::Idle => sleeping += 1,
                        _ => {}
                    }
                    let name = p.name().to_string_lossy().into_owned();
                    let mem = if total_memory > 0 {
                        p.memory() as f64 / total_memory as f64 * 100.0
                    } else {
                        -1.0
                    };
                    RawProcess {
                        pid: p.pid().as_u32(),
                        name: (!name.is_empty()).then_some(name),
                        cpu: (p.cpu_usage() as f64 / cores).min(100.0),
                        mem,
                        mem_rss: p.memory(),
                    }
                })
                .collect();
            list.sort_by_key(|p| p.pid);

            Ok(RawProcessList {
                all: list.len().min(u32::MAX as usize) as u32,
                running,
                blocked,
                sleeping,
                list,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_system"))]
    async fn read_system(&self) -> anyhow::Result<RawSystem> {
        tokio::task::spawn_blocking(|| {
            let distro = linux::read_os_pretty_name_linux()
                .or_else(System::long_os_version)
                .or_else(System::name)
                .unwrap_or_default();
            Ok(RawSystem {
                platform: std::env::consts::OS.into(),
                distro,
                release: System::os_version().unwrap_or_default(),
                hostname: System::host_name().unwrap_or_default(),
                uptime_secs: System::uptime(),
                timezone: linux::read_timezone_linux()
                    .unwrap_or_else(|| chrono::Local::now().format("%:z").to_string()),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}
