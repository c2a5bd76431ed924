//! The self-driven loops, run against Tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use perf_observatory::host::{
    HeapUsage, HostEnvironment, MemoryProbe, MonotonicClock, StaticMemoryProbe,
};
use perf_observatory::overlay::{InMemorySurface, OVERLAY_ID};
use perf_observatory::{MetricsCollector, MonitorConfig};

fn paused_collector(
    memory: Option<Arc<StaticMemoryProbe>>,
) -> (Arc<MetricsCollector>, Arc<InMemorySurface>) {
    let surface = Arc::new(InMemorySurface::new());
    let host = HostEnvironment {
        clock: Arc::new(MonotonicClock::new()),
        memory: memory.map(|probe| probe as Arc<dyn MemoryProbe>),
        timeline: None,
        surface: surface.clone(),
    };
    (
        Arc::new(MetricsCollector::with_host(MonitorConfig::default(), host)),
        surface,
    )
}

#[tokio::test(start_paused = true)]
async fn frame_loop_samples_every_sixteen_ms() {
    let (collector, _) = paused_collector(None);
    collector.start();

    tokio::time::sleep(Duration::from_millis(81)).await;
    assert!((collector.current_fps() - 62.5).abs() < 1e-6);
    assert!((collector.average_fps() - 62.5).abs() < 1e-6);

    let report = collector.stop();
    assert_eq!(report.frames, 5);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_without_an_extra_tick() {
    let (collector, _) = paused_collector(None);
    collector.start();
    tokio::time::sleep(Duration::from_millis(40)).await;
    let frames = collector.stop().frames;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(collector.frame_count(), frames);
}

#[tokio::test(start_paused = true)]
async fn double_start_does_not_double_sample() {
    let (collector, _) = paused_collector(None);
    collector.start();
    collector.start();

    tokio::time::sleep(Duration::from_millis(33)).await;
    assert_eq!(collector.frame_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn memory_loop_samples_once_per_second() {
    let probe = Arc::new(StaticMemoryProbe::new(HeapUsage {
        used_bytes: 32 << 20,
        total_bytes: 64 << 20,
        limit_bytes: 2048 << 20,
    }));
    let (collector, _) = paused_collector(Some(probe));
    collector.start();

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    collector.stop();

    // One reading at start, then t = 1 s, 2 s, 3 s
    let memory = collector.export_data().metrics.memory;
    assert_eq!(memory.len(), 4);
    assert_eq!(memory[0].used_mb, 32.0);
}

#[tokio::test(start_paused = true)]
async fn overlay_refreshes_until_hidden() {
    let (collector, surface) = paused_collector(None);
    collector.start();
    assert!(collector.show_overlay());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let text = surface.content(OVERLAY_ID).unwrap();
    assert!(text.contains("FPS: 62.5"), "{text}");

    assert!(collector.hide_overlay());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(surface.content(OVERLAY_ID).is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_collector_ends_its_loops() {
    let (collector, _) = paused_collector(None);
    collector.start();
    let weak = Arc::downgrade(&collector);
    drop(collector);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(weak.upgrade().is_none());
}

#[tokio::test(start_paused = true)]
async fn zero_intervals_still_sample() {
    let probe = Arc::new(StaticMemoryProbe::new(HeapUsage {
        used_bytes: 8 << 20,
        total_bytes: 16 << 20,
        limit_bytes: 2048 << 20,
    }));
    let host = HostEnvironment {
        clock: Arc::new(MonotonicClock::new()),
        memory: Some(probe as Arc<dyn MemoryProbe>),
        timeline: None,
        surface: Arc::new(InMemorySurface::new()),
    };
    let config = MonitorConfig {
        frame_interval_ms: 0,
        memory_interval_ms: 0,
        ..MonitorConfig::default()
    };
    let collector = Arc::new(MetricsCollector::with_host(config, host));
    collector.start();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let report = collector.stop();
    assert!(report.frames >= 90, "frames = {}", report.frames);
    assert!(collector.export_data().metrics.memory.len() > 1);
}
