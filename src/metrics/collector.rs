use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};
use uuid::Uuid;

use super::report::{
    round2, ExportData, FpsSummary, MarkEntry, MemoryReading, PerformanceReport,
    SeriesExport,
};
use super::series::BoundedSeries;
use super::{BlockExecution, Measure, MemorySample, RenderRecord};
use crate::config::MonitorConfig;
use crate::host::{Clock, HostEnvironment, MemoryProbe, Timeline};
use crate::overlay::{render_overlay, OverlaySurface, OVERLAY_ID};
use crate::utils::SlowFrameDetector;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe performance monitor for a block-program host.
///
/// The host calls `track_*`, `mark` and `measure` at points of interest;
/// once `start()`ed, the collector drives its own frame and memory sampling
/// loops. Share it as `Arc<MetricsCollector>`.
pub struct MetricsCollector {
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    memory: Option<Arc<dyn MemoryProbe>>,
    timeline: Option<Arc<dyn Timeline>>,
    surface: Arc<dyn OverlaySurface>,
    /// Resolved once at construction
    memory_introspection_available: bool,
    inner: Mutex<Inner>,
    loops: Mutex<Loops>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    // Bounded series
    fps: BoundedSeries<f64>,
    memory: BoundedSeries<MemorySample>,
    block_executions: BoundedSeries<BlockExecution>,
    renders: BoundedSeries<RenderRecord>,

    // Timeline
    marks: IndexMap<String, f64>,
    measures: Vec<Measure>,

    // Session
    active: bool,
    session_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    session_start_ms: Option<f64>,
    last_frame_ms: f64,
    frame_count: u64,
    slow_frames: SlowFrameDetector,
}

/// Cancellation handles for the self-driven loops.
#[derive(Default)]
struct Loops {
    frame: Option<JoinHandle<()>>,
    memory: Option<JoinHandle<()>>,
    overlay: Option<JoinHandle<()>>,
}

impl Loops {
    fn abort_sampling(&mut self) {
        for handle in [self.frame.take(), self.memory.take()].into_iter().flatten() {
            handle.abort();
        }
    }

    fn abort_overlay(&mut self) {
        if let Some(handle) = self.overlay.take() {
            handle.abort();
        }
    }
}

// ─── MetricsCollector impl ───────────────────────────────────────

impl MetricsCollector {
    /// Collector wired to the real process: monotonic clock, sysinfo memory
    /// probe, tracing timeline.
    pub fn new(config: MonitorConfig, surface: Arc<dyn OverlaySurface>) -> Self {
        Self::with_host(config, HostEnvironment::system(surface))
    }

    pub fn with_host(config: MonitorConfig, host: HostEnvironment) -> Self {
        let memory_introspection_available =
            config.track_memory && host.memory.is_some();
        let timeline = host.timeline.filter(|_| config.native_timeline);

        Self {
            inner: Mutex::new(Inner::new(&config)),
            loops: Mutex::new(Loops::default()),
            clock: host.clock,
            memory: host.memory,
            timeline,
            surface: host.surface,
            memory_introspection_available,
            config,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn memory_introspection_available(&self) -> bool {
        self.memory_introspection_available
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    pub fn frame_count(&self) -> u64 {
        self.inner.lock().frame_count
    }

    // ── Session control ─────────────────────────────────────────

    /// Begin a monitoring session. No-op if one is already running.
    ///
    /// Sampling loops are spawned on the current Tokio runtime; outside a
    /// runtime the host is expected to call `on_frame` / `sample_memory`.
    pub fn start(self: &Arc<Self>) {
        let session_id = {
            let mut inner = self.inner.lock();
            if inner.active {
                return;
            }
            let now = self.clock.now_ms();
            let id = Uuid::new_v4();
            inner.active = true;
            inner.frame_count = 0;
            inner.slow_frames.reset();
            inner.session_id = Some(id);
            inner.started_at = Some(Utc::now());
            inner.session_start_ms = Some(now);
            inner.last_frame_ms = now;
            id
        };

        // First memory reading right away; the loop takes it from there
        if self.memory_introspection_available {
            self.sample_memory();
        }

        let mut loops = self.loops.lock();
        loops.abort_sampling();
        loops.frame = self.spawn_every(self.config.frame_interval_ms, Self::on_frame);
        if self.memory_introspection_available {
            loops.memory =
                self.spawn_every(self.config.memory_interval_ms, Self::sample_memory);
        }

        info!(
            %session_id,
            memory = self.memory_introspection_available,
            "performance monitoring started"
        );
    }

    /// End the session (data is kept) and return the final report.
    pub fn stop(&self) -> PerformanceReport {
        let was_active = std::mem::replace(&mut self.inner.lock().active, false);
        self.loops.lock().abort_sampling();
        if was_active {
            info!("performance monitoring stopped");
        }
        self.report()
    }

    /// Wipe all recorded data. Leaves the active flag alone.
    pub fn clear(&self) {
        self.inner.lock().clear_data();
        debug!("performance data cleared");
    }

    // ── Sampling ────────────────────────────────────────────────

    /// One display-frame callback. Returns false once monitoring is off.
    pub fn on_frame(&self) -> bool {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();
        if !inner.active {
            return false;
        }

        let delta = now - inner.last_frame_ms;
        if delta > 0.0 {
            inner.fps.push(1000.0 / delta);
        }
        inner.frame_count += 1;
        inner.last_frame_ms = now;
        inner.slow_frames.observe(delta);
        true
    }

    /// Take one memory reading. Returns false once monitoring is off or the
    /// host has no memory introspection.
    pub fn sample_memory(&self) -> bool {
        let Some(probe) = self.memory_probe() else {
            return false;
        };
        if !self.is_active() {
            return false;
        }

        // A failed read is transient; keep the loop alive
        let Some(usage) = probe.heap_usage() else {
            trace!("memory probe returned no reading");
            return true;
        };
        let sample = MemorySample::from_usage(usage, self.clock.now_ms());

        let mut inner = self.inner.lock();
        if !inner.active {
            return false;
        }
        inner.memory.push(sample);
        true
    }

    // ── Marks & measures ────────────────────────────────────────

    /// Record the current time under `label`, replacing any earlier mark.
    pub fn mark(&self, label: &str) {
        let now = self.clock.now_ms();
        self.inner.lock().marks.insert(label.to_owned(), now);

        if let Some(timeline) = &self.timeline {
            if let Err(e) = timeline.mark(label, now) {
                trace!(label, error = %e, "native timeline rejected mark");
            }
        }
    }

    /// Duration between two marks, recorded as a measure named `label`.
    /// `None` (and nothing recorded) if either mark is unknown.
    pub fn measure(
        &self,
        label: &str,
        start_label: &str,
        end_label: &str,
    ) -> Option<f64> {
        let duration = {
            let mut inner = self.inner.lock();
            let start = *inner.marks.get(start_label)?;
            let end = *inner.marks.get(end_label)?;
            let duration = end - start;
            inner.measures.push(Measure {
                label: label.to_owned(),
                duration_ms: duration,
                start_ms: start,
                end_ms: end,
            });
            duration
        };

        if let Some(timeline) = &self.timeline {
            if let Err(e) = timeline.measure(label, start_label, end_label) {
                trace!(label, error = %e, "native timeline rejected measure");
            }
        }
        Some(duration)
    }

    // ── Event recording ─────────────────────────────────────────

    pub fn track_block_execution(&self, name: impl Into<String>, duration_ms: f64) {
        let timestamp_ms = self.clock.now_ms();
        self.inner.lock().block_executions.push(BlockExecution {
            name: name.into(),
            duration_ms,
            timestamp_ms,
        });
    }

    pub fn track_render(&self, duration_ms: f64) {
        let timestamp_ms = self.clock.now_ms();
        self.inner.lock().renders.push(RenderRecord {
            duration_ms,
            timestamp_ms,
        });
    }

    // ── Reporting ───────────────────────────────────────────────

    /// Most recent frame rate, 0 before the first frame.
    pub fn current_fps(&self) -> f64 {
        self.inner.lock().fps.last().copied().unwrap_or(0.0)
    }

    /// Mean over the frame-rate window, 0 when empty.
    pub fn average_fps(&self) -> f64 {
        let inner = self.inner.lock();
        if inner.fps.is_empty() {
            return 0.0;
        }
        inner.fps.iter().sum::<f64>() / inner.fps.len() as f64
    }

    /// `None` when the host cannot report memory.
    pub fn current_memory(&self) -> Option<MemoryReading> {
        let inner = self.inner.lock();
        self.memory_reading(&inner)
    }

    pub fn report(&self) -> PerformanceReport {
        let inner = self.inner.lock();
        self.build_report(&inner)
    }

    /// Block executions slower than `threshold_ms`, slowest first.
    /// Equal durations keep recording order.
    pub fn slow_blocks(&self, threshold_ms: f64) -> Vec<BlockExecution> {
        let mut slow: Vec<BlockExecution> = self
            .inner
            .lock()
            .block_executions
            .iter()
            .filter(|b| b.duration_ms > threshold_ms)
            .cloned()
            .collect();
        slow.sort_by(|a, b| b.duration_ms.total_cmp(&a.duration_ms));
        slow
    }

    /// Everything recorded so far plus a report, for offline analysis.
    pub fn export_data(&self) -> ExportData {
        let inner = self.inner.lock();
        ExportData {
            exported_at: Utc::now(),
            metrics: SeriesExport {
                fps: inner.fps.to_vec(),
                memory: inner.memory.to_vec(),
                block_executions: inner.block_executions.to_vec(),
                renders: inner.renders.to_vec(),
            },
            marks: inner
                .marks
                .iter()
                .map(|(label, &timestamp_ms)| MarkEntry {
                    label: label.clone(),
                    timestamp_ms,
                })
                .collect(),
            measures: inner.measures.clone(),
            report: self.build_report(&inner),
        }
    }

    // ── Overlay ─────────────────────────────────────────────────

    /// Attach the live panel. Returns false if it was already showing.
    pub fn show_overlay(self: &Arc<Self>) -> bool {
        if !self.surface.attach(OVERLAY_ID) {
            return false;
        }
        self.refresh_overlay();

        let mut loops = self.loops.lock();
        loops.abort_overlay();
        loops.overlay =
            self.spawn_every(self.config.frame_interval_ms, Self::refresh_overlay);
        true
    }

    /// Redraw the panel once. Returns false once the panel is gone.
    pub fn refresh_overlay(&self) -> bool {
        if !self.surface.contains(OVERLAY_ID) {
            return false;
        }
        let text = {
            let inner = self.inner.lock();
            let memory = self
                .memory_probe()
                .and(inner.memory.last())
                .map(MemoryReading::from);
            render_overlay(
                inner.fps.last().copied().unwrap_or(0.0),
                memory.as_ref(),
                inner.frame_count,
            )
        };
        self.surface.set_content(OVERLAY_ID, &text)
    }

    /// Detach the panel. Returns false if it was not showing.
    pub fn hide_overlay(&self) -> bool {
        self.loops.lock().abort_overlay();
        self.surface.remove(OVERLAY_ID)
    }

    // ── Internals ───────────────────────────────────────────────

    fn memory_probe(&self) -> Option<&Arc<dyn MemoryProbe>> {
        self.memory
            .as_ref()
            .filter(|_| self.memory_introspection_available)
    }

    /// Latest sample, or a live read if nothing has been sampled yet.
    fn memory_reading(&self, inner: &Inner) -> Option<MemoryReading> {
        let probe = self.memory_probe()?;
        match inner.memory.last() {
            Some(sample) => Some(MemoryReading::from(sample)),
            None => {
                let usage = probe.heap_usage()?;
                let sample = MemorySample::from_usage(usage, self.clock.now_ms());
                Some(MemoryReading::from(&sample))
            }
        }
    }

    fn build_report(&self, inner: &Inner) -> PerformanceReport {
        let now = self.clock.now_ms();
        PerformanceReport {
            session_id: inner.session_id,
            active: inner.active,
            started_at: inner.started_at,
            duration_ms: inner.session_start_ms.map_or(0.0, |start| now - start),
            frames: inner.frame_count,
            slow_frames: inner.slow_frames.count(),
            worst_frame_ms: round2(inner.slow_frames.worst_ms()),
            fps: FpsSummary::from_series(&inner.fps),
            memory: self.memory_reading(inner),
            block_executions: inner.block_executions.len(),
            renders: inner.renders.len(),
            measures: inner.measures.clone(),
        }
    }

    /// Run `step` every `period_ms` (at least 1 ms) until it returns false or
    /// the collector is dropped. `None` outside a Tokio runtime.
    fn spawn_every(
        self: &Arc<Self>,
        period_ms: u64,
        step: fn(&Self) -> bool,
    ) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            debug!("no async runtime; host drives sampling");
            return None;
        };

        let collector: Weak<Self> = Arc::downgrade(self);
        let period = Duration::from_millis(period_ms.max(1));
        Some(runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(collector) = collector.upgrade() else {
                    break;
                };
                if !step(&collector) {
                    break;
                }
            }
        }))
    }
}

impl Drop for MetricsCollector {
    fn drop(&mut self) {
        let loops = self.loops.get_mut();
        loops.abort_sampling();
        loops.abort_overlay();
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn new(config: &MonitorConfig) -> Self {
        Self {
            fps: BoundedSeries::new(config.fps_capacity),
            memory: BoundedSeries::new(config.memory_capacity),
            block_executions: BoundedSeries::new(config.event_capacity),
            renders: BoundedSeries::new(config.event_capacity),
            marks: IndexMap::new(),
            measures: Vec::new(),
            active: false,
            session_id: None,
            started_at: None,
            session_start_ms: None,
            last_frame_ms: 0.0,
            frame_count: 0,
            slow_frames: SlowFrameDetector::new(config.slow_frame_threshold_ms),
        }
    }

    fn clear_data(&mut self) {
        self.fps.clear();
        self.memory.clear();
        self.block_executions.clear();
        self.renders.clear();
        self.marks.clear();
        self.measures.clear();
        self.frame_count = 0;
        self.slow_frames.reset();
    }
}
