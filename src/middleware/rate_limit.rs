use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::metrics::{RATE_LIMIT_ADMITTED, RATE_LIMIT_REJECTED};
use crate::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};
use crate::response::ApiResponse;
use crate::state::AppState;

pub const RATE_LIMITED: &str = "RATE_LIMITED";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";

// quota for one group of routes, shared through the process-wide limiter
#[derive(Clone)]
pub struct RouteLimit {
    pub scope: &'static str,
    pub policy: RateLimitPolicy,
    limiter: Arc<RateLimiter>,
    trust_forwarded: bool,
}

impl RouteLimit {
    pub fn new(state: &AppState, scope: &'static str, policy: RateLimitPolicy) -> Self {
        Self {
            scope,
            policy,
            limiter: state.limiter.clone(),
            trust_forwarded: state.config.trust_forwarded,
        }
    }
}

pub async fn rate_limit(State(limit): State<RouteLimit>, req: Request, next: Next) -> Response {
    let client = client_identifier(&req, limit.trust_forwarded);
    let identifier = format!("{}:{}", limit.scope, client);
    let decision = limit.limiter.check(&identifier, limit.policy);

    if decision.limited {
        RATE_LIMIT_REJECTED.with_label_values(&[limit.scope]).inc();
        tracing::warn!(scope = limit.scope, client = %client, "rate limit exceeded");
        return too_many_requests(decision);
    }

    RATE_LIMIT_ADMITTED.with_label_values(&[limit.scope]).inc();
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    response
}

// a rejection is a normal outcome, not a failure: nothing about the quota leaks
pub fn too_many_requests(decision: RateLimitDecision) -> Response {
    let retry_after_secs = (decision.retry_after_ms + 999) / 1000;
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        ApiResponse::<()>::error(
            "Too many requests, please try again later",
            Some(RATE_LIMITED),
            None,
        ),
    )
        .into_response();
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs.max(1)));
    response
}

pub fn client_identifier(req: &Request, trust_forwarded: bool) -> String {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let forwarded = if trust_forwarded {
        forwarded_client(req.headers())
    } else {
        None
    };

    forwarded
        .or(remote)
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').map(str::trim).find(|ip| !ip.is_empty()))
        })
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn prefers_real_ip_then_forwarded_for() {
        let req = request(&[("x-forwarded-for", " , 10.0.0.2, 10.0.0.3"), ("x-real-ip", "10.0.0.1")]);
        assert_eq!(client_identifier(&req, true), "10.0.0.1");

        let req = request(&[("x-forwarded-for", " , 10.0.0.2, 10.0.0.3")]);
        assert_eq!(client_identifier(&req, true), "10.0.0.2");
    }

    #[test]
    fn ignores_proxy_headers_unless_trusted() {
        let mut req = request(&[("x-real-ip", "10.0.0.1")]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 7], 4000))));
        assert_eq!(client_identifier(&req, false), "192.168.1.7");
        assert_eq!(client_identifier(&request(&[]), false), "unknown");
    }

    #[test]
    fn rejection_rounds_retry_after_up() {
        let response = too_many_requests(RateLimitDecision {
            limited: true,
            remaining: 0,
            retry_after_ms: 1_200,
        });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "2");
    }
}
