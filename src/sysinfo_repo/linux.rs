// Linux-specific helpers: /proc, /etc, /sys (net operstate, DRM GPUs).

use crate::counter_source::RawGpu;

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Distro display name from /etc/os-release.
pub(super) fn read_os_pretty_name_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        let value = content
            .lines()
            .find_map(|l| l.strip_prefix("PRETTY_NAME="))
            .or_else(|| content.lines().find_map(|l| l.strip_prefix("NAME=")))?
            .trim_matches('"');
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

/// IANA zone name from TZ, /etc/timezone, or the /etc/localtime symlink.
pub(super) fn read_timezone_linux() -> Option<String> {
    if let Ok(tz) = std::env::var("TZ")
        && !tz.trim().is_empty()
    {
        return Some(tz.trim_start_matches(':').to_string());
    }
    #[cfg(target_os = "linux")]
    {
        if let Ok(s) = std::fs::read_to_string("/etc/timezone") {
            let s = s.trim();
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
        let target = std::fs::read_link("/etc/localtime").ok()?;
        let target = target.to_string_lossy();
        target
            .split_once("zoneinfo/")
            .map(|(_, zone)| zone.to_string())
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Interface operstate from /sys/class/net/<interface>/operstate. Non-Linux
/// hosts report every interface as up.
pub(super) fn interface_is_up(interface_name: &str) -> bool {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/operstate", interface_name);
        if let Ok(content) = std::fs::read_to_string(&path) {
            return content.trim() == "up";
        }
        false
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        true
    }
}

fn vendor_name(pci_vendor: &str) -> &'static str {
    match pci_vendor.trim().to_ascii_lowercase().as_str() {
        "0x10de" => "NVIDIA",
        "0x1002" => "AMD",
        "0x8086" => "Intel",
        "0x1af4" => "Red Hat (virtio)",
        "0x15ad" => "VMware",
        _ => "Unknown",
    }
}

/// GPUs from /sys/class/drm/cardN (Linux). Ok(None) when no DRM card is
/// present or the platform has no DRM sysfs.
pub(super) fn read_drm_gpus() -> anyhow::Result<Option<Vec<RawGpu>>> {
    #[cfg(target_os = "linux")]
    {
        use std::path::Path;

        let drm = Path::new("/sys/class/drm");
        if !drm.exists() {
            return Ok(None);
        }
        let mut cards: Vec<String> = std::fs::read_dir(drm)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| {
                n.strip_prefix("card").is_some_and(|rest| {
                    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
                })
            })
            .collect();
        cards.sort();

        let read = |card: &str, file: &str| -> Option<String> {
            std::fs::read_to_string(drm.join(card).join("device").join(file))
                .ok()
                .map(|s| s.trim().to_string())
        };
        let read_u64 =
            |card: &str, file: &str| read(card, file).and_then(|s| s.parse::<u64>().ok());

        let gpus: Vec<RawGpu> = cards
            .iter()
            .filter_map(|card| {
                let card = card.as_str();
                let vendor_id = read(card, "vendor")?;
                let device_id = read(card, "device").unwrap_or_default();
                let vendor = vendor_name(&vendor_id);
                let memory_total = read_u64(card, "mem_info_vram_total");
                let memory_used = read_u64(card, "mem_info_vram_used");
                Some(RawGpu {
                    model: read(card, "product_name")
                        .unwrap_or_else(|| format!("{} {}", vendor, device_id)),
                    vendor: vendor.to_string(),
                    vram_mb: memory_total.map(|b| b / (1024 * 1024)),
                    temperature: read_hwmon_temp(&drm.join(card).join("device")),
                    utilization: read_u64(card, "gpu_busy_percent").map(|v| v as f64),
                    memory_used: memory_used.map(|b| b / (1024 * 1024)),
                    memory_total: memory_total.map(|b| b / (1024 * 1024)),
                })
            })
            .collect();
        if gpus.is_empty() {
            return Ok(None);
        }
        Ok(Some(gpus))
    }
    #[cfg(not(target_os = "linux"))]
    Ok(None)
}

#[cfg(target_os = "linux")]
fn read_hwmon_temp(device: &std::path::Path) -> Option<f64> {
    let hwmon = std::fs::read_dir(device.join("hwmon")).ok()?;
    hwmon.filter_map(|e| e.ok()).find_map(|e| {
        let milli = std::fs::read_to_string(e.path().join("temp1_input")).ok()?;
        milli.trim().parse::<f64>().ok().map(|m| m / 1000.0)
    })
}
