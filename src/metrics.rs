use lazy_static::lazy_static;
use prometheus::{
    Encoder, Gauge, Histogram, IntCounter, IntCounterVec, TextEncoder, register_gauge,
    register_histogram, register_int_counter, register_int_counter_vec,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: IntCounter =
        register_int_counter!("site_requests_total", "Total number of API requests")
            .expect("register site_requests_total");
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "site_request_latency_seconds",
        "Request latency in seconds"
    )
    .expect("register site_request_latency_seconds");
    pub static ref RATE_LIMIT_ADMITTED: IntCounterVec = register_int_counter_vec!(
        "site_rate_limit_admitted_total",
        "Requests admitted by the rate limiter",
        &["scope"]
    )
    .expect("register site_rate_limit_admitted_total");
    pub static ref RATE_LIMIT_REJECTED: IntCounterVec = register_int_counter_vec!(
        "site_rate_limit_rejected_total",
        "Requests rejected by the rate limiter",
        &["scope"]
    )
    .expect("register site_rate_limit_rejected_total");
    pub static ref TRACKED_IDENTIFIERS: Gauge = register_gauge!(
        "site_rate_limit_identifiers",
        "Identifiers held by the rate limiter after the last sweep"
    )
    .expect("register site_rate_limit_identifiers");
    pub static ref FAILURES: IntCounterVec = register_int_counter_vec!(
        "site_failures_total",
        "Handler failures by error code",
        &["code"]
    )
    .expect("register site_failures_total");
}

// Prometheus text exposition of the default registry
pub fn render() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
