use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::host::Clock;

// ─── Debounce ────────────────────────────────────────────────────

/// Runs `func` once calls have been quiet for `wait`.
///
/// Each `call` cancels the pending invocation and schedules a new one with
/// the latest argument. Must be used from within a Tokio runtime.
pub struct Debouncer<T> {
    wait: Duration,
    func: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(wait: Duration, func: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            wait,
            func: Arc::new(func),
            pending: Mutex::new(None),
        }
    }

    pub fn call(&self, arg: T) {
        let func = Arc::clone(&self.func);
        let wait = self.wait;

        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            func(arg);
        }));
    }

    /// Drop the pending invocation, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(previous) = self.pending.get_mut().take() {
            previous.abort();
        }
    }
}

// ─── Throttle ────────────────────────────────────────────────────

/// Lets at most one call through per `limit_ms` window.
pub struct Throttle<F> {
    func: F,
    limit_ms: f64,
    clock: Arc<dyn Clock>,
    /// Clock time at which the next call may pass
    open_at: Mutex<Option<f64>>,
}

impl<F> Throttle<F> {
    pub fn new(func: F, limit_ms: f64, clock: Arc<dyn Clock>) -> Self {
        Self {
            func,
            limit_ms,
            clock,
            open_at: Mutex::new(None),
        }
    }

    /// `Some(result)` if the call went through, `None` if it was dropped.
    pub fn call<A, R>(&self, arg: A) -> Option<R>
    where
        F: Fn(A) -> R,
    {
        let now = self.clock.now_ms();
        {
            let mut open_at = self.open_at.lock();
            if matches!(*open_at, Some(t) if now < t) {
                return None;
            }
            *open_at = Some(now + self.limit_ms);
        }
        Some((self.func)(arg))
    }
}
