use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::PerformanceReport;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MonitorStatus {
    pub active: bool,
    pub message: String,
}

// ─── POST /api/perf/start ────────────────────────────────────────

pub async fn start_monitoring(
    State(state): State<Arc<AppState>>,
) -> Json<MonitorStatus> {
    let already = state.metrics.is_active();
    state.metrics.start();
    Json(MonitorStatus {
        active: true,
        message: if already {
            "Monitoring already active".into()
        } else {
            "Monitoring started".into()
        },
    })
}

// ─── POST /api/perf/stop ─────────────────────────────────────────

pub async fn stop_monitoring(
    State(state): State<Arc<AppState>>,
) -> Json<PerformanceReport> {
    Json(state.metrics.stop())
}

// ─── POST /api/perf/clear ────────────────────────────────────────

pub async fn clear_metrics(
    State(state): State<Arc<AppState>>,
) -> Json<MonitorStatus> {
    state.metrics.clear();
    Json(MonitorStatus {
        active: state.metrics.is_active(),
        message: "Metrics cleared".into(),
    })
}
