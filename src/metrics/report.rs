use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::series::BoundedSeries;
use super::{BlockExecution, Measure, MemorySample, RenderRecord};

/// Round to two decimals, the precision every report figure is shown at.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Frame-rate breakdown for one report.
/// An empty series reports zeros across the board rather than ±infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FpsSummary {
    pub current: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl FpsSummary {
    pub fn from_series(series: &BoundedSeries<f64>) -> Self {
        if series.is_empty() {
            return Self::empty();
        }

        let (min, max, sum) = series.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );

        Self {
            current: round2(series.last().copied().unwrap_or(0.0)),
            average: round2(sum / series.len() as f64),
            min: round2(min),
            max: round2(max),
        }
    }

    pub fn empty() -> Self {
        Self {
            current: 0.0,
            average: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }
}

/// Memory figures in megabytes, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryReading {
    pub used_mb: f64,
    pub total_mb: f64,
    pub limit_mb: f64,
}

impl From<&MemorySample> for MemoryReading {
    fn from(sample: &MemorySample) -> Self {
        Self {
            used_mb: round2(sample.used_mb),
            total_mb: round2(sample.total_mb),
            limit_mb: round2(sample.limit_mb),
        }
    }
}

/// Aggregate snapshot returned by `report()` and `stop()`.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub session_id: Option<Uuid>,
    pub active: bool,
    pub started_at: Option<DateTime<Utc>>,
    /// Milliseconds since the session started (0 before the first start)
    pub duration_ms: f64,
    pub frames: u64,
    pub slow_frames: u64,
    /// Longest frame delta that counted as slow (0 if none)
    pub worst_frame_ms: f64,
    pub fps: FpsSummary,
    pub memory: Option<MemoryReading>,
    pub block_executions: usize,
    pub renders: usize,
    pub measures: Vec<Measure>,
}

/// One `(label, timestamp)` pair in an export, in first-marked order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkEntry {
    pub label: String,
    pub timestamp_ms: f64,
}

/// Raw series copied out for offline analysis.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesExport {
    pub fps: Vec<f64>,
    pub memory: Vec<MemorySample>,
    pub block_executions: Vec<BlockExecution>,
    pub renders: Vec<RenderRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportData {
    pub exported_at: DateTime<Utc>,
    pub metrics: SeriesExport,
    pub marks: Vec<MarkEntry>,
    pub measures: Vec<Measure>,
    pub report: PerformanceReport,
}
