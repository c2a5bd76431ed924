use parking_lot::Mutex;
use tokio::time::Instant;

/// Millisecond time source the collector reads all timestamps from.
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> f64;
}

/// Wall-clock time anchored at construction.
///
/// Built on `tokio::time::Instant`, so paused-time tests see the same
/// timeline as the sampling loops.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for hosts that own their own timeline (and for tests).
#[derive(Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Mutex::new(start_ms),
        }
    }

    /// Move time forward. Negative steps are ignored.
    pub fn advance(&self, ms: f64) {
        if ms > 0.0 {
            *self.now.lock() += ms;
        }
    }

    /// Jump to an absolute time, if it is not in the past.
    pub fn set(&self, ms: f64) {
        let mut now = self.now.lock();
        if ms > *now {
            *now = ms;
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_forward() {
        let clock = ManualClock::new(10.0);
        clock.advance(5.0);
        clock.advance(-3.0);
        assert_eq!(clock.now_ms(), 15.0);

        clock.set(12.0);
        assert_eq!(clock.now_ms(), 15.0);
        clock.set(40.0);
        assert_eq!(clock.now_ms(), 40.0);
    }

    #[tokio::test(start_paused = true)]
    async fn monotonic_clock_follows_tokio_time() {
        let clock = MonotonicClock::new();
        tokio::time::advance(std::time::Duration::from_millis(250)).await;
        assert!((clock.now_ms() - 250.0).abs() < 1e-6);
    }
}
