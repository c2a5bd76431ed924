use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::metrics::MetricsCollector;

/// Blocks a simulated program draws from, with their typical cost (ms).
const BLOCK_PALETTE: &[(&str, f64)] = &[
    ("start", 0.2),
    ("repeat", 0.5),
    ("playNote", 4.0),
    ("pitch", 1.5),
    ("forward", 2.0),
    ("right", 1.0),
    ("setColor", 0.8),
    ("wait", 12.0),
    ("drum", 6.0),
    ("arc", 9.0),
];

// ─── Configuration ───────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Number of block programs running concurrently
    #[serde(default = "default_programs")]
    pub programs: u32,

    /// How long the simulation runs (seconds)
    #[serde(default = "default_duration")]
    pub duration_secs: u64,

    /// Blocks executed between two render passes
    #[serde(default = "default_blocks_per_render")]
    pub blocks_per_render: u32,

    /// Blocks in one pass of a program, bracketed by marks
    #[serde(default = "default_program_length")]
    pub program_length: u32,
}

fn default_programs() -> u32 {
    4
}
fn default_duration() -> u64 {
    10
}
fn default_blocks_per_render() -> u32 {
    8
}
fn default_program_length() -> u32 {
    24
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            programs: default_programs(),
            duration_secs: default_duration(),
            blocks_per_render: default_blocks_per_render(),
            program_length: default_program_length(),
        }
    }
}

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `config.programs` Tokio tasks that execute random blocks until
/// the deadline or the `running` flag is set to false.
pub async fn run(
    running: Arc<AtomicBool>,
    metrics: Arc<MetricsCollector>,
    config: SimulationConfig,
) {
    let deadline = Instant::now() + Duration::from_secs(config.duration_secs);

    let mut handles = Vec::with_capacity(config.programs as usize);
    for program_id in 0..config.programs {
        let running = running.clone();
        let metrics = metrics.clone();
        let config = config.clone();

        handles.push(tokio::spawn(async move {
            program(program_id, running, metrics, deadline, config).await;
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    running.store(false, Ordering::SeqCst);
    tracing::info!("simulation finished");
}

// ─── Program loop ────────────────────────────────────────────────

async fn program(
    id: u32,
    running: Arc<AtomicBool>,
    metrics: Arc<MetricsCollector>,
    deadline: Instant,
    config: SimulationConfig,
) {
    // Deterministic per-program RNG
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);
    let start_mark = format!("program-{id}-start");
    let end_mark = format!("program-{id}-end");
    let mut executed: u64 = 0;

    while running.load(Ordering::Relaxed) && Instant::now() < deadline {
        metrics.mark(&start_mark);

        for _ in 0..config.program_length.max(1) {
            if !running.load(Ordering::Relaxed) {
                break;
            }
            execute_block(&mut rng, &metrics).await;
            executed += 1;

            if executed % config.blocks_per_render.max(1) as u64 == 0 {
                render(&mut rng, &metrics).await;
            }
        }

        metrics.mark(&end_mark);
        metrics.measure(&format!("program-{id}"), &start_mark, &end_mark);
    }
}

/// Run one random block and report how long it actually took.
async fn execute_block(rng: &mut StdRng, metrics: &MetricsCollector) {
    let (name, typical_ms) = BLOCK_PALETTE[rng.gen_range(0..BLOCK_PALETTE.len())];

    // Occasionally a block runs far past its usual cost
    let factor = if rng.gen_bool(0.05) {
        rng.gen_range(3.0..8.0)
    } else {
        rng.gen_range(0.5..1.5)
    };

    let t0 = Instant::now();
    sleep(Duration::from_secs_f64(typical_ms * factor / 1000.0)).await;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

    metrics.track_block_execution(name, elapsed_ms);
}

async fn render(rng: &mut StdRng, metrics: &MetricsCollector) {
    let t0 = Instant::now();
    sleep(Duration::from_secs_f64(rng.gen_range(2.0..14.0) / 1000.0)).await;
    metrics.track_render(t0.elapsed().as_secs_f64() * 1000.0);
}
