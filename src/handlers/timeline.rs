use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{require_label, AppError};
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct MarkRequest {
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasureRequest {
    pub label: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct MeasureResponse {
    pub label: String,
    /// `null` when either mark has never been recorded
    pub duration_ms: Option<f64>,
}

// ─── POST /api/perf/marks ────────────────────────────────────────

pub async fn create_mark(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarkRequest>,
) -> Result<StatusCode, AppError> {
    require_label("label", &req.label)?;
    state.metrics.mark(&req.label);
    Ok(StatusCode::NO_CONTENT)
}

// ─── POST /api/perf/measures ─────────────────────────────────────

pub async fn create_measure(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MeasureRequest>,
) -> Result<Json<MeasureResponse>, AppError> {
    require_label("label", &req.label)?;
    require_label("start", &req.start)?;
    require_label("end", &req.end)?;

    let duration_ms = state.metrics.measure(&req.label, &req.start, &req.end);
    Ok(Json(MeasureResponse {
        label: req.label,
        duration_ms,
    }))
}
