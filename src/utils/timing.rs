use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::host::MemoryProbe;

/// Hosts reporting less memory than this get heavy features switched off.
pub const LOW_MEMORY_LIMIT_MB: f64 = 512.0;

/// Run `f`, log `label: X.XXms`, hand back its result.
pub fn measure_time<R>(label: &str, f: impl FnOnce() -> R) -> R {
    let start = Instant::now();
    let result = f();
    let ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::info!("{label}: {ms:.2}ms");
    result
}

/// Async twin of [`measure_time`]; the clock runs across every await.
pub async fn measure_time_async<R>(
    label: &str,
    fut: impl Future<Output = R>,
) -> R {
    let start = Instant::now();
    let result = fut.await;
    let ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::info!("{label}: {ms:.2}ms");
    result
}

// ─── Profiled wrapper ────────────────────────────────────────────

/// Wraps a function and warns whenever one call runs past `threshold_ms`.
pub struct Profiled<F> {
    name: String,
    threshold_ms: f64,
    func: F,
    slow_calls: AtomicU64,
}

impl<F> Profiled<F> {
    pub fn new(name: impl Into<String>, threshold_ms: f64, func: F) -> Self {
        Self {
            name: name.into(),
            threshold_ms,
            func,
            slow_calls: AtomicU64::new(0),
        }
    }

    pub fn call<A, R>(&self, arg: A) -> R
    where
        F: Fn(A) -> R,
    {
        let start = Instant::now();
        let result = (self.func)(arg);
        let ms = start.elapsed().as_secs_f64() * 1000.0;
        if ms > self.threshold_ms {
            self.slow_calls.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "Slow function detected: {} took {ms:.2}ms",
                self.name
            );
        }
        result
    }

    pub fn slow_calls(&self) -> u64 {
        self.slow_calls.load(Ordering::Relaxed)
    }
}

// ─── Slow frames ─────────────────────────────────────────────────

/// Counts frame deltas that exceed a budget, remembering the worst one.
#[derive(Debug, Clone)]
pub struct SlowFrameDetector {
    threshold_ms: f64,
    slow_frames: u64,
    worst_ms: f64,
}

impl SlowFrameDetector {
    pub fn new(threshold_ms: f64) -> Self {
        Self {
            threshold_ms,
            slow_frames: 0,
            worst_ms: 0.0,
        }
    }

    /// Feed one frame delta. Returns true if it was slow.
    pub fn observe(&mut self, delta_ms: f64) -> bool {
        if delta_ms <= self.threshold_ms {
            return false;
        }
        self.slow_frames += 1;
        self.worst_ms = self.worst_ms.max(delta_ms);
        tracing::warn!("Slow frame detected: {delta_ms:.2}ms");
        true
    }

    pub fn count(&self) -> u64 {
        self.slow_frames
    }

    pub fn worst_ms(&self) -> f64 {
        self.worst_ms
    }

    pub fn reset(&mut self) {
        self.slow_frames = 0;
        self.worst_ms = 0.0;
    }
}

/// Gate for memory-hungry features on low-end hosts.
///
/// Judged on the host's memory *limit*, not the currently allocated total,
/// which for a process is its virtual size and says little about the device.
/// Hosts that cannot report memory are given the benefit of the doubt.
pub fn should_enable_feature(probe: Option<&dyn MemoryProbe>, feature: &str) -> bool {
    let Some(usage) = probe.and_then(|p| p.heap_usage()) else {
        return true;
    };
    let limit_mb = usage.limit_bytes as f64 / 1_048_576.0;
    if limit_mb < LOW_MEMORY_LIMIT_MB {
        tracing::info!("Feature {feature} disabled due to low memory");
        return false;
    }
    true
}
