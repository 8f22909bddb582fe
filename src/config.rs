use serde::Deserialize;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::session::StreamConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
    #[serde(default)]
    pub processes: ProcessesConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Attempts per cycle, including the first one.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_step_ms")]
    pub retry_step_ms: u64,
    /// Messages buffered per viewer before the session waits on the socket.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_step_ms() -> u64 {
    100
}

fn default_outbox_capacity() -> usize {
    16
}

fn default_send_timeout_secs() -> u64 {
    10
}

fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_retries: default_max_retries(),
            retry_step_ms: default_retry_step_ms(),
            outbox_capacity: default_outbox_capacity(),
            send_timeout_secs: default_send_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessesConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    10
}

impl Default for ProcessesConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

/// Viewer-side recording window and chart length.
#[derive(Debug, Clone, Deserialize)]
pub struct RecorderConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_chart_points")]
    pub chart_points: usize,
}

fn default_duration_secs() -> u64 {
    300
}

fn default_chart_points() -> usize {
    60
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            chart_points: default_chart_points(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log active session count at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`); `PORT` overrides `server.port`.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        let mut config: AppConfig = toml::from_str(&s)?;
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number, got {:?}: {}", port, e))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            interval: Duration::from_millis(self.streaming.interval_ms),
            retry: RetryPolicy::new(
                self.streaming.max_retries,
                Duration::from_millis(self.streaming.retry_step_ms),
            ),
            top_n: self.processes.top_n,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.streaming.interval_ms > 0,
            "streaming.interval_ms must be > 0, got {}",
            self.streaming.interval_ms
        );
        anyhow::ensure!(
            self.streaming.max_retries > 0,
            "streaming.max_retries must be > 0, got {}",
            self.streaming.max_retries
        );
        anyhow::ensure!(
            self.streaming.retry_step_ms > 0,
            "streaming.retry_step_ms must be > 0, got {}",
            self.streaming.retry_step_ms
        );
        anyhow::ensure!(
            self.streaming.outbox_capacity > 0,
            "streaming.outbox_capacity must be > 0, got {}",
            self.streaming.outbox_capacity
        );
        anyhow::ensure!(
            self.streaming.send_timeout_secs > 0,
            "streaming.send_timeout_secs must be > 0, got {}",
            self.streaming.send_timeout_secs
        );
        anyhow::ensure!(
            self.streaming.ping_interval_secs > 0,
            "streaming.ping_interval_secs must be > 0, got {}",
            self.streaming.ping_interval_secs
        );
        anyhow::ensure!(
            self.processes.top_n > 0,
            "processes.top_n must be > 0, got {}",
            self.processes.top_n
        );
        anyhow::ensure!(
            self.recorder.duration_secs > 0,
            "recorder.duration_secs must be > 0, got {}",
            self.recorder.duration_secs
        );
        anyhow::ensure!(
            self.recorder.chart_points > 0,
            "recorder.chart_points must be > 0, got {}",
            self.recorder.chart_points
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
