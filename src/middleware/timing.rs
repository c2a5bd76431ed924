use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Adds a `Server-Timing: handler;dur=<ms>` header to every response and
/// logs one line per API call through `tracing`.
///
/// Streams are skipped in the log; their "duration" is the connection life.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let start = Instant::now();
    let mut response = next.run(req).await;
    let ms = start.elapsed().as_secs_f64() * 1000.0;

    let server_timing = format!("handler;dur={ms:.3}");
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("server-timing", val);
    }

    let status = response.status().as_u16();
    if path.starts_with("/api/") && !path.ends_with("/stream") {
        if status >= 500 {
            tracing::error!(%method, %path, status, ms, "request failed");
        } else if status >= 400 {
            tracing::warn!(%method, %path, status, ms, "request rejected");
        } else {
            tracing::debug!(%method, %path, status, ms, "request");
        }
    }

    response
}
