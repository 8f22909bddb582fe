// Recording window statistics, chart history and the viewer model

mod common;

use std::time::Duration;

use common::{sample, sample_snapshot};
use resmon::config::RecorderConfig;
use resmon::models::ServerMessage;
use resmon::recorder::{ChartHistory, RecorderError, SessionRecorder};
use resmon::viewer::ViewerState;

fn started_recorder() -> SessionRecorder {
    let mut recorder = SessionRecorder::new(Duration::from_secs(300));
    recorder.start_at(0);
    recorder
}

#[test]
fn test_statistics_without_samples_fails() {
    let recorder = started_recorder();
    assert_eq!(recorder.statistics().unwrap_err(), RecorderError::NoSamples);
    assert_eq!(
        SessionRecorder::default().statistics().unwrap_err(),
        RecorderError::NoSamples
    );
}

#[test]
fn test_single_sample_statistics() {
    let mut recorder = started_recorder();
    assert!(recorder.record(sample(1000, 50.0, 60.0, 100, 200)));
    let report = recorder.statistics().expect("report");
    assert_eq!(report.cpu.avg, 50.0);
    assert_eq!(report.cpu.max, 50.0);
    assert_eq!(report.cpu.min, 50.0);
    assert_eq!(report.memory.avg, 60.0);
    assert_eq!(report.sample_count, 1);
}

#[test]
fn test_statistics_avg_max_min() {
    let mut recorder = started_recorder();
    for (i, cpu) in [10.0, 20.0, 30.0].into_iter().enumerate() {
        recorder.record(sample(i as i64 * 1000, cpu, 40.0, 0, 0));
    }
    let report = recorder.statistics().expect("report");
    assert_eq!(report.cpu.avg, 20.0);
    assert_eq!(report.cpu.max, 30.0);
    assert_eq!(report.cpu.min, 10.0);
    assert_eq!(report.started_at, 0);
    assert_eq!(report.ended_at, 2000);
}

#[test]
fn test_percent_average_rounded_to_one_decimal() {
    let mut recorder = started_recorder();
    for cpu in [10.0, 10.0, 11.0] {
        recorder.record(sample(0, cpu, 0.0, 0, 0));
    }
    assert_eq!(recorder.statistics().expect("report").cpu.avg, 10.3);
}

#[test]
fn test_throughput_avg_and_max() {
    let mut recorder = started_recorder();
    recorder.record(sample(0, 0.0, 0.0, 100, 1_000));
    recorder.record(sample(1000, 0.0, 0.0, 300, 0));
    let report = recorder.statistics().expect("report");
    assert_eq!(report.network_rx.avg, 200.0);
    assert_eq!(report.network_rx.max, 300);
    assert_eq!(report.network_tx.avg, 500.0);
    assert_eq!(report.network_tx.max, 1_000);
    assert_eq!(report.disk_read.max, 0);
}

#[test]
fn test_record_is_noop_when_inactive() {
    let mut recorder = SessionRecorder::new(Duration::from_secs(60));
    assert!(!recorder.record(sample(0, 1.0, 1.0, 0, 0)));
    assert!(recorder.samples().is_empty());

    recorder.start_at(0);
    recorder.record(sample(0, 1.0, 1.0, 0, 0));
    recorder.stop();
    recorder.stop();
    assert!(!recorder.is_active());
    assert!(!recorder.record(sample(1, 2.0, 2.0, 0, 0)));
    assert_eq!(recorder.samples().len(), 1);
    // Frozen window is still reportable.
    assert_eq!(recorder.statistics().expect("report").cpu.avg, 1.0);
}

#[test]
fn test_restart_discards_previous_window() {
    let mut recorder = started_recorder();
    recorder.record(sample(0, 90.0, 90.0, 0, 0));
    recorder.stop();
    recorder.start_at(10_000);
    assert!(recorder.samples().is_empty());
    assert_eq!(recorder.started_at(), Some(10_000));
    assert_eq!(recorder.statistics().unwrap_err(), RecorderError::NoSamples);
}

#[test]
fn test_window_expiry_and_progress() {
    let mut recorder = SessionRecorder::new(Duration::from_secs(10));
    assert!(!recorder.is_expired(1_000_000));
    recorder.start_at(1_000);
    assert_eq!(recorder.elapsed_millis(6_000), 5_000);
    assert_eq!(recorder.progress_percent(6_000), 50.0);
    assert!(!recorder.is_expired(10_999));
    assert!(recorder.is_expired(11_000));
    assert_eq!(recorder.progress_percent(50_000), 100.0);
    recorder.stop();
    assert!(!recorder.is_expired(50_000));
}

#[test]
fn test_chart_history_evicts_oldest() {
    let mut history = ChartHistory::new(3);
    for i in 0..5 {
        history.push(sample(i, i as f64, 0.0, 0, 0));
    }
    assert_eq!(history.len(), 3);
    assert_eq!(history.capacity(), 3);
    assert_eq!(history.cpu_series(), vec![2.0, 3.0, 4.0]);
    assert_eq!(history.iter().next().map(|s| s.timestamp_millis), Some(2));
}

#[test]
fn test_chart_history_default_capacity() {
    let history = ChartHistory::default();
    assert!(history.is_empty());
    assert_eq!(history.capacity(), 60);
}

fn metrics(timestamp: i64, cpu: f64) -> ServerMessage {
    ServerMessage::Metrics(Box::new(sample_snapshot(timestamp, cpu, 50.0)))
}

#[test]
fn test_viewer_feeds_history_and_recorder() {
    let mut viewer = ViewerState::new(&RecorderConfig {
        duration_secs: 10,
        chart_points: 2,
    });
    viewer.handle(metrics(0, 5.0), 0);
    assert!(!viewer.is_recording());
    assert_eq!(viewer.history().len(), 1);

    viewer.start_recording(1_000);
    viewer.handle(metrics(1_000, 10.0), 1_000);
    viewer.handle(metrics(2_000, 30.0), 2_000);
    assert_eq!(viewer.history().cpu_series(), vec![10.0, 30.0]);
    assert_eq!(viewer.latest().map(|s| s.timestamp), Some(2_000));

    let report = viewer.report().expect("report");
    assert_eq!(report.sample_count, 2);
    assert_eq!(report.cpu.avg, 20.0);
}

#[test]
fn test_viewer_error_keeps_latest_snapshot() {
    let mut viewer = ViewerState::default();
    viewer.handle(metrics(0, 5.0), 0);
    viewer.handle(
        ServerMessage::Error {
            message: "failed to collect metrics".into(),
        },
        1_000,
    );
    assert_eq!(viewer.last_error(), Some("failed to collect metrics"));
    assert_eq!(viewer.latest().map(|s| s.timestamp), Some(0));

    viewer.handle(metrics(2_000, 6.0), 2_000);
    assert!(viewer.last_error().is_none());
}

#[test]
fn test_viewer_auto_stops_after_window() {
    let mut viewer = ViewerState::new(&RecorderConfig {
        duration_secs: 5,
        chart_points: 60,
    });
    viewer.start_recording(0);
    viewer.handle(metrics(1_000, 40.0), 1_000);
    assert!(!viewer.tick(4_999));
    assert!(viewer.tick(5_000));
    assert!(!viewer.is_recording());
    assert!(!viewer.tick(6_000));

    viewer.handle(metrics(6_000, 99.0), 6_000);
    assert_eq!(viewer.recorder().samples().len(), 1);
    assert_eq!(viewer.report().expect("report").cpu.max, 40.0);
}

#[test]
fn test_viewer_message_after_expiry_is_not_recorded() {
    let mut viewer = ViewerState::new(&RecorderConfig {
        duration_secs: 5,
        chart_points: 60,
    });
    viewer.start_recording(0);
    viewer.handle(metrics(7_000, 99.0), 7_000);
    assert!(!viewer.is_recording());
    assert_eq!(viewer.report().unwrap_err(), RecorderError::NoSamples);
}
