use perf_observatory::{server, AppState, MonitorConfig, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("perf_observatory=info")),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   🔬  BLOCK PERFORMANCE OBSERVATORY              ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Load configuration ────────────────────────────────────
    let monitor_config = MonitorConfig::from_env().unwrap_or_else(|e| {
        eprintln!("❌ {e}");
        std::process::exit(1);
    });
    let server_config = ServerConfig::from_env();

    // ── 2. Build shared state ────────────────────────────────────
    let state = AppState::new(monitor_config);
    if !state.metrics.memory_introspection_available() {
        tracing::warn!("memory introspection unavailable; memory metrics disabled");
    }

    // ── 3. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state, &server_config.static_dir);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let addr = server_config.bind_addr.as_str();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("❌ Failed to bind to {addr}: {e}");
            std::process::exit(1);
        });

    println!();
    println!("Server listening on http://{addr}");
    println!("Dashboard       → http://{addr}/");
    println!("Report JSON     → http://{addr}/api/perf/report");
    println!("Report SSE      → http://{addr}/api/perf/stream");
    println!("Overlay SSE     → http://{addr}/api/perf/overlay/stream");
    println!();

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server exited with error: {e}");
        std::process::exit(1);
    }
}
