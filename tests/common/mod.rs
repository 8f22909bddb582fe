// Shared test helpers: a scriptable CounterSource and sample snapshots

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use resmon::counter_source::*;
use resmon::models::*;

/// Deterministic source. Each counter read advances its bytes by a fixed step
/// and its capture time by `step_millis`. Individual families can be made to fail.
pub struct FakeSource {
    pub cpu_load: Mutex<f64>,
    pub cpu_failures_remaining: AtomicU32,
    pub cpu_always_fails: AtomicBool,
    pub memory_fails: AtomicBool,
    pub gpu_fails: AtomicBool,
    pub gpu: Mutex<Option<Vec<RawGpu>>>,
    pub processes_fail: AtomicBool,
    pub processes: Mutex<Vec<RawProcess>>,
    pub disk_io_missing: AtomicBool,
    pub interfaces: Mutex<Vec<RawInterface>>,
    pub clock_millis: AtomicI64,
    pub step_millis: i64,
    pub disk_step_bytes: u64,
    pub net_step_bytes: u64,
    disk_reads: AtomicU64,
    net_reads: AtomicU64,
    pub cpu_reads: AtomicU32,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            cpu_load: Mutex::new(25.0),
            cpu_failures_remaining: AtomicU32::new(0),
            cpu_always_fails: AtomicBool::new(false),
            memory_fails: AtomicBool::new(false),
            gpu_fails: AtomicBool::new(false),
            gpu: Mutex::new(None),
            processes_fail: AtomicBool::new(false),
            processes: Mutex::new(sample_processes()),
            disk_io_missing: AtomicBool::new(false),
            interfaces: Mutex::new(vec![iface("eth0", true, 0, 0)]),
            clock_millis: AtomicI64::new(1_700_000_000_000),
            step_millis: 1000,
            disk_step_bytes: 4096,
            net_step_bytes: 1000,
            disk_reads: AtomicU64::new(0),
            net_reads: AtomicU64::new(0),
            cpu_reads: AtomicU32::new(0),
        }
    }
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_cpu(times: u32) -> Self {
        let source = Self::default();
        source.cpu_failures_remaining.store(times, Ordering::SeqCst);
        source
    }

    pub fn always_failing_cpu() -> Self {
        let source = Self::default();
        source.cpu_always_fails.store(true, Ordering::SeqCst);
        source
    }

    /// Capture time of the `n`th read of a counter family.
    fn captured_at(&self, n: u64) -> i64 {
        self.clock_millis.load(Ordering::SeqCst) + n as i64 * self.step_millis
    }
}

pub fn iface(name: &str, is_up: bool, rx_bytes: u64, tx_bytes: u64) -> RawInterface {
    RawInterface {
        name: name.into(),
        is_up,
        rx_bytes,
        tx_bytes,
    }
}

pub fn proc_entry(pid: u32, name: Option<&str>, cpu: f64, mem: f64) -> RawProcess {
    RawProcess {
        pid,
        name: name.map(String::from),
        cpu,
        mem,
        mem_rss: (mem.max(0.0) * 1_000_000.0) as u64,
    }
}

pub fn sample_processes() -> Vec<RawProcess> {
    vec![
        proc_entry(1, Some("init"), 0.1, 0.2),
        proc_entry(42, Some("postgres"), 12.34, 8.76),
        proc_entry(77, Some("node"), 45.06, 3.21),
    ]
}

#[async_trait]
impl CounterSource for FakeSource {
    async fn read_cpu(&self) -> anyhow::Result<RawCpu> {
        self.cpu_reads.fetch_add(1, Ordering::SeqCst);
        if self.cpu_always_fails.load(Ordering::SeqCst) {
            anyhow::bail!("cpu sensor offline");
        }
        if self
            .cpu_failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            anyhow::bail!("cpu sensor busy");
        }
        let load = *self.cpu_load.lock().unwrap();
        Ok(RawCpu {
            load_percent: load,
            core_loads: vec![load, load],
            temperature: Some(48.0),
            temperature_max: Some(52.0),
            brand: "Fake CPU".into(),
            speed_ghz: 3.2,
            physical_cores: 1,
            logical_cores: 2,
        })
    }

    async fn read_memory(&self) -> anyhow::Result<RawMemory> {
        if self.memory_fails.load(Ordering::SeqCst) {
            anyhow::bail!("meminfo unreadable");
        }
        Ok(RawMemory {
            total: 8_000,
            used: 2_000,
            free: 5_000,
            available: 6_000,
            swap_total: 0,
            swap_used: 0,
        })
    }

    async fn read_disk_usage(&self) -> anyhow::Result<Vec<RawFilesystem>> {
        Ok(vec![RawFilesystem {
            mount: "/".into(),
            fs_type: "ext4".into(),
            size: 1_000,
            used: 250,
            available: 750,
            use_percent: 25.04,
        }])
    }

    async fn read_disk_io(&self) -> anyhow::Result<Option<CounterSnapshot>> {
        if self.disk_io_missing.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let n = self.disk_reads.fetch_add(1, Ordering::SeqCst) + 1;
        let bytes = n * self.disk_step_bytes;
        Ok(Some(CounterSnapshot::disk(self.captured_at(n), bytes, bytes / 2)))
    }

    async fn read_network(&self) -> anyhow::Result<RawNetwork> {
        let n = self.net_reads.fetch_add(1, Ordering::SeqCst) + 1;
        let grown = n * self.net_step_bytes;
        let interfaces = self
            .interfaces
            .lock()
            .unwrap()
            .iter()
            .map(|i| RawInterface {
                name: i.name.clone(),
                is_up: i.is_up,
                rx_bytes: if i.is_up { i.rx_bytes + grown } else { i.rx_bytes },
                tx_bytes: if i.is_up { i.tx_bytes + grown * 2 } else { i.tx_bytes },
            })
            .collect();
        Ok(RawNetwork {
            captured_at_millis: self.captured_at(n),
            interfaces,
        })
    }

    async fn read_gpu(&self) -> anyhow::Result<Option<Vec<RawGpu>>> {
        if self.gpu_fails.load(Ordering::SeqCst) {
            anyhow::bail!("gpu driver not loaded");
        }
        Ok(self.gpu.lock().unwrap().clone())
    }

    async fn read_processes(&self) -> anyhow::Result<RawProcessList> {
        if self.processes_fail.load(Ordering::SeqCst) {
            anyhow::bail!("process table unavailable");
        }
        let list = self.processes.lock().unwrap().clone();
        Ok(RawProcessList {
            all: list.len() as u32,
            running: 1,
            blocked: 0,
            sleeping: list.len().saturating_sub(1) as u32,
            list,
        })
    }

    async fn read_system(&self) -> anyhow::Result<RawSystem> {
        Ok(RawSystem {
            platform: "linux".into(),
            distro: "Test Linux".into(),
            release: "6.1".into(),
            hostname: "testhost".into(),
            uptime_secs: 3600,
            timezone: "UTC".into(),
        })
    }
}

pub fn sample_snapshot(timestamp: i64, cpu_percent: f64, memory_percent: f64) -> Snapshot {
    Snapshot {
        timestamp,
        cpu: CpuStats {
            usage_percent: cpu_percent,
            core_loads: vec![CoreLoad {
                core: 0,
                load: cpu_percent,
            }],
            temperature: None,
            temperature_max: None,
            brand: "test".into(),
            speed_ghz: 0.0,
            physical_cores: 1,
            cores: 1,
        },
        memory: MemoryStats {
            total: 100,
            used: 50,
            free: 50,
            available: 50,
            usage_percent: memory_percent,
            swap_total: 0,
            swap_used: 0,
            swap_percent: 0.0,
        },
        disk: DiskStats {
            disks: vec![],
            io: DiskIo::default(),
        },
        network: NetworkStats {
            interfaces: vec![],
            total: NetworkTotals::default(),
        },
        gpu: None,
        system: SystemStats {
            platform: "linux".into(),
            distro: String::new(),
            release: String::new(),
            hostname: String::new(),
            uptime_secs: 0,
            timezone: String::new(),
        },
        processes: None,
    }
}

pub fn sample(timestamp_millis: i64, cpu: f64, mem: f64, rx: u64, tx: u64) -> ScalarSample {
    ScalarSample {
        timestamp_millis,
        cpu_percent: cpu,
        memory_percent: mem,
        net_rx_bps: rx,
        net_tx_bps: tx,
        disk_read_bps: 0,
        disk_write_bps: 0,
    }
}
