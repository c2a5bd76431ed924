//! Frame-rate, memory and timing instrumentation for block-program hosts,
//! with an HTTP console and live overlay.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod metrics;
pub mod middleware;
pub mod overlay;
pub mod server;
pub mod simulator;
pub mod utils;

pub use config::{MonitorConfig, ServerConfig};
pub use error::PerfError;
pub use metrics::MetricsCollector;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Central collector — handlers record into it, SSE reads reports.
    pub metrics: Arc<MetricsCollector>,

    /// Surface the overlay panel is attached to; the overlay SSE reads it.
    pub surface: Arc<overlay::InMemorySurface>,

    /// Flag checked by every simulated program on each block.
    pub simulation_running: Arc<AtomicBool>,

    /// Handle to the spawned simulation so `stop` can await clean shutdown.
    pub simulation_handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl AppState {
    /// State backed by the real process (sysinfo memory, tracing timeline).
    pub fn new(config: MonitorConfig) -> Arc<Self> {
        let surface = Arc::new(overlay::InMemorySurface::new());
        let metrics = MetricsCollector::new(config, surface.clone());
        Self::with_collector(metrics, surface)
    }

    pub fn with_collector(
        metrics: MetricsCollector,
        surface: Arc<overlay::InMemorySurface>,
    ) -> Arc<Self> {
        Arc::new(Self {
            metrics: Arc::new(metrics),
            surface,
            simulation_running: Arc::new(AtomicBool::new(false)),
            simulation_handle: tokio::sync::Mutex::new(None),
        })
    }
}
