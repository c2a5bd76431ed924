use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::simulator::SimulationConfig;
use crate::AppState;

use super::AppError;

#[derive(Debug, Serialize)]
pub struct SimulationStatus {
    pub running: bool,
    pub message: String,
}

// ─── POST /api/simulation/start ──────────────────────────────────

pub async fn start_simulation(
    State(state): State<Arc<AppState>>,
    Json(config): Json<SimulationConfig>,
) -> Result<Json<SimulationStatus>, AppError> {
    // Guard: only one simulation at a time
    if state.simulation_running.load(Ordering::SeqCst) {
        return Err(AppError::AlreadyRunning);
    }

    if config.programs == 0 || config.programs > 64 {
        return Err(AppError::BadRequest(
            "programs must be between 1 and 64".into(),
        ));
    }
    if config.duration_secs == 0 || config.duration_secs > 300 {
        return Err(AppError::BadRequest(
            "duration_secs must be between 1 and 300".into(),
        ));
    }
    if config.blocks_per_render == 0 || config.program_length == 0 {
        return Err(AppError::BadRequest(
            "blocks_per_render and program_length must be at least 1".into(),
        ));
    }

    // Fresh data and a running session for the simulated host
    state.metrics.clear();
    state.metrics.start();

    // Flip the flag BEFORE spawning so programs see it immediately
    state.simulation_running.store(true, Ordering::SeqCst);

    let msg = format!(
        "Started: {} programs × {}s, render every {} blocks",
        config.programs, config.duration_secs, config.blocks_per_render,
    );

    let running = state.simulation_running.clone();
    let metrics = state.metrics.clone();
    let handle = tokio::spawn(async move {
        crate::simulator::run(running, metrics, config).await;
    });

    // Stash the handle so `stop` can await clean shutdown
    *state.simulation_handle.lock().await = Some(handle);

    Ok(Json(SimulationStatus {
        running: true,
        message: msg,
    }))
}

// ─── POST /api/simulation/stop ───────────────────────────────────

pub async fn stop_simulation(
    State(state): State<Arc<AppState>>,
) -> Json<SimulationStatus> {
    if !state.simulation_running.load(Ordering::SeqCst) {
        return Json(SimulationStatus {
            running: false,
            message: "No simulation is running".into(),
        });
    }

    state.simulation_running.store(false, Ordering::SeqCst);

    let mut guard = state.simulation_handle.lock().await;
    if let Some(handle) = guard.take() {
        // Ignore JoinError — the task may have already finished
        let _ = handle.await;
    }

    Json(SimulationStatus {
        running: false,
        message: "Simulation stopped".into(),
    })
}

// ─── GET /api/simulation/status ──────────────────────────────────

pub async fn simulation_status(
    State(state): State<Arc<AppState>>,
) -> Json<SimulationStatus> {
    let running = state.simulation_running.load(Ordering::SeqCst);
    Json(SimulationStatus {
        running,
        message: if running {
            "Simulation in progress".into()
        } else {
            "Idle".into()
        },
    })
}
