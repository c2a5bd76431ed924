use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use super::AppError;
use crate::overlay::OVERLAY_ID;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct OverlayStatus {
    pub visible: bool,
    /// false when the request found the overlay already in that state
    pub changed: bool,
}

// ─── POST /api/perf/overlay ──────────────────────────────────────

pub async fn show_overlay(
    State(state): State<Arc<AppState>>,
) -> Json<OverlayStatus> {
    let changed = state.metrics.show_overlay();
    Json(OverlayStatus {
        visible: true,
        changed,
    })
}

// ─── DELETE /api/perf/overlay ────────────────────────────────────

pub async fn hide_overlay(
    State(state): State<Arc<AppState>>,
) -> Json<OverlayStatus> {
    let changed = state.metrics.hide_overlay();
    Json(OverlayStatus {
        visible: false,
        changed,
    })
}

// ─── GET /api/perf/overlay ───────────────────────────────────────

pub async fn overlay_content(
    State(state): State<Arc<AppState>>,
) -> Result<String, AppError> {
    state
        .surface
        .content(OVERLAY_ID)
        .ok_or_else(|| AppError::NotFound("Overlay is not shown".into()))
}

// ─── GET /api/perf/overlay/stream ────────────────────────────────
/// Pushes the panel text ten times a second while the overlay is shown.

pub async fn overlay_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(Duration::from_millis(100));

    let stream = IntervalStream::new(interval).filter_map(move |_| {
        state
            .surface
            .content(OVERLAY_ID)
            .map(|text| Ok(Event::default().data(text)))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
