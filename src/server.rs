use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::handlers;
use crate::metrics::stream;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes, middleware, and static serving.
pub fn create_router(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        // ── Session control ─────────────────────────────────────
        .route("/api/perf/start", post(handlers::monitor::start_monitoring))
        .route("/api/perf/stop", post(handlers::monitor::stop_monitoring))
        .route("/api/perf/clear", post(handlers::monitor::clear_metrics))
        // ── Recording ───────────────────────────────────────────
        .route("/api/perf/marks", post(handlers::timeline::create_mark))
        .route(
            "/api/perf/measures",
            post(handlers::timeline::create_measure),
        )
        .route("/api/perf/blocks", post(handlers::events::track_block))
        .route("/api/perf/renders", post(handlers::events::track_render))
        // ── Reporting ───────────────────────────────────────────
        .route("/api/perf/report", get(stream::get_report))
        .route("/api/perf/stream", get(stream::report_stream))
        .route("/api/perf/export", get(stream::export_data))
        .route("/api/perf/slow-blocks", get(handlers::events::slow_blocks))
        // ── Overlay ─────────────────────────────────────────────
        .route(
            "/api/perf/overlay",
            get(handlers::overlay::overlay_content)
                .post(handlers::overlay::show_overlay)
                .delete(handlers::overlay::hide_overlay),
        )
        .route(
            "/api/perf/overlay/stream",
            get(handlers::overlay::overlay_stream),
        )
        // ── Simulated host ──────────────────────────────────────
        .route(
            "/api/simulation/start",
            post(handlers::simulation::start_simulation),
        )
        .route(
            "/api/simulation/stop",
            post(handlers::simulation::stop_simulation),
        )
        .route(
            "/api/simulation/status",
            get(handlers::simulation::simulation_status),
        )
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Serve the dashboard ─────────────────────────────────
        .fallback_service(ServeDir::new(static_dir))
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(CorsLayer::permissive())
}
