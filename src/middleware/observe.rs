use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};

// track request count and latency for /metrics
pub async fn observe_requests(req: Request, next: Next) -> Response {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let response = next.run(req).await;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    response
}
