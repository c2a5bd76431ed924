use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use super::report::{ExportData, PerformanceReport};
use crate::AppState;

// ─── GET /api/perf/report ────────────────────────────────────────
/// One JSON report — the `perfReport()` of the HTTP console.

pub async fn get_report(
    State(state): State<Arc<AppState>>,
) -> Json<PerformanceReport> {
    Json(state.metrics.report())
}

// ─── GET /api/perf/export ────────────────────────────────────────

pub async fn export_data(
    State(state): State<Arc<AppState>>,
) -> Json<ExportData> {
    Json(state.metrics.export_data())
}

// ─── GET /api/perf/stream ────────────────────────────────────────
/// Server-Sent Events feed for the dashboard's report panel.
/// Each event is one `PerformanceReport`, sent every 500 ms whether or not a
/// session is running, so the panel also shows the final figures after a stop.

pub async fn report_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(Duration::from_millis(500));

    let stream = IntervalStream::new(interval).map(move |_| {
        let report = state.metrics.report();
        let json = serde_json::to_string(&report).unwrap_or_default();
        Ok(Event::default().data(json))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
