// Background stats logger: reports how many viewer sessions are live.
// Sessions run their own cadence; this task only observes the registry.

use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::registry::SessionRegistry;

pub struct StatsLoggerConfig {
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Spawns the periodic INFO line with the active session count.
/// Exits when `shutdown_rx` fires or its sender is dropped.
pub fn spawn_stats_logger(
    registry: Arc<SessionRegistry>,
    config: StatsLoggerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_secs(config.stats_log_interval_secs.max(1));
    tokio::spawn(async move {
        let mut stats_log_tick = interval(period);
        stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so the first line reflects a full period.
        stats_log_tick.tick().await;

        let mut peak_sessions = registry.len();
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    tracing::debug!("Stats logger shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    let active_sessions = registry.len();
                    peak_sessions = peak_sessions.max(active_sessions);
                    tracing::info!(
                        active_sessions,
                        peak_sessions,
                        "app stats"
                    );
                }
            }
        }
    })
}
