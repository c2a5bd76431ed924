use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{require_duration, require_label, AppError};
use crate::metrics::BlockExecution;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct BlockExecutionRequest {
    /// e.g. "playNote"
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlowBlocksQuery {
    /// Falls back to the collector's configured threshold
    pub threshold_ms: Option<f64>,
}

// ─── POST /api/perf/blocks ───────────────────────────────────────

pub async fn track_block(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BlockExecutionRequest>,
) -> Result<StatusCode, AppError> {
    require_label("name", &req.name)?;
    require_duration("duration_ms", req.duration_ms)?;
    state.metrics.track_block_execution(req.name, req.duration_ms);
    Ok(StatusCode::NO_CONTENT)
}

// ─── POST /api/perf/renders ──────────────────────────────────────

pub async fn track_render(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenderRequest>,
) -> Result<StatusCode, AppError> {
    require_duration("duration_ms", req.duration_ms)?;
    state.metrics.track_render(req.duration_ms);
    Ok(StatusCode::NO_CONTENT)
}

// ─── GET /api/perf/slow-blocks ───────────────────────────────────

pub async fn slow_blocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlowBlocksQuery>,
) -> Result<Json<Vec<BlockExecution>>, AppError> {
    let threshold = query
        .threshold_ms
        .unwrap_or(state.metrics.config().slow_block_threshold_ms);
    require_duration("threshold_ms", threshold)?;
    Ok(Json(state.metrics.slow_blocks(threshold)))
}
