use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{PerfError, Result};

/// A native timeline registry that external inspection tools read.
///
/// Forwarding is best-effort: the collector drops any error these return.
pub trait Timeline: Send + Sync {
    fn mark(&self, label: &str, timestamp_ms: f64) -> Result<()>;

    fn measure(&self, label: &str, start_label: &str, end_label: &str)
        -> Result<()>;
}

/// Emits marks and measures as `tracing` events on the `perf::timeline`
/// target, so they land in whatever subscriber the host installed.
///
/// Like a browser timeline it keeps its own mark table and rejects
/// measures between marks it never saw.
#[derive(Default)]
pub struct TracingTimeline {
    marks: Mutex<HashMap<String, f64>>,
}

impl TracingTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.marks.lock().clear();
    }
}

impl Timeline for TracingTimeline {
    fn mark(&self, label: &str, timestamp_ms: f64) -> Result<()> {
        self.marks.lock().insert(label.to_owned(), timestamp_ms);
        tracing::trace!(target: "perf::timeline", label, timestamp_ms, "mark");
        Ok(())
    }

    fn measure(
        &self,
        label: &str,
        start_label: &str,
        end_label: &str,
    ) -> Result<()> {
        let marks = self.marks.lock();
        let start = *marks
            .get(start_label)
            .ok_or_else(|| PerfError::UnknownMark(start_label.to_owned()))?;
        let end = *marks
            .get(end_label)
            .ok_or_else(|| PerfError::UnknownMark(end_label.to_owned()))?;
        tracing::trace!(
            target: "perf::timeline",
            label,
            duration_ms = end - start,
            "measure"
        );
        Ok(())
    }
}
