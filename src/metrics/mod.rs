pub mod collector;
pub mod report;
pub mod series;
pub mod stream;

pub use collector::MetricsCollector;
pub use report::{
    ExportData, FpsSummary, MarkEntry, MemoryReading, PerformanceReport,
    SeriesExport,
};
pub use series::BoundedSeries;

use serde::Serialize;

use crate::host::HeapUsage;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// One block run reported by the host's execution engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockExecution {
    /// e.g. "playNote", "repeat"
    pub name: String,
    pub duration_ms: f64,
    /// Collector clock time at which the record was taken
    pub timestamp_ms: f64,
}

/// One render pass reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRecord {
    pub duration_ms: f64,
    pub timestamp_ms: f64,
}

/// One memory reading, already converted to megabytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySample {
    pub used_mb: f64,
    pub total_mb: f64,
    pub limit_mb: f64,
    pub timestamp_ms: f64,
}

impl MemorySample {
    pub fn from_usage(usage: HeapUsage, timestamp_ms: f64) -> Self {
        Self {
            used_mb: usage.used_bytes as f64 / BYTES_PER_MB,
            total_mb: usage.total_bytes as f64 / BYTES_PER_MB,
            limit_mb: usage.limit_bytes as f64 / BYTES_PER_MB,
            timestamp_ms,
        }
    }
}

/// A named duration resolved from two marks. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    pub label: String,
    pub duration_ms: f64,
    pub start_ms: f64,
    pub end_ms: f64,
}
