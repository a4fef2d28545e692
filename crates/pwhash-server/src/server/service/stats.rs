use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use pwhash::RequestStats;
use std::sync::Arc;
use tokio::time::Instant;

/// Path whose latency is tracked.
pub const MEASURED_PATH: &str = "/hash";

/// Times every request and records the duration of `POST /hash` into
/// `stats`. Everything else passes through unmeasured.
pub async fn record_hash_latency(
    State(stats): State<Arc<RequestStats>>,
    req: Request,
    next: Next,
) -> Response {
    let measured = req.method() == Method::POST && req.uri().path() == MEASURED_PATH;
    let start = Instant::now();

    let response = next.run(req).await;

    if measured {
        stats.record(start.elapsed().as_secs_f64() * 1000.0);
    }
    response
}
