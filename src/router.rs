use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::{envelope_failures, method_not_allowed, panic_to_failure, route_not_found};
use crate::handlers::{
    contact_handler, get_profile_handler, health_handler, list_services_handler, login_handler,
    logout_handler, metrics_handler, update_profile_handler,
};
use crate::middleware::{RouteLimit, observe_requests, rate_limit};
use crate::rate_limit::RateLimitPolicy;
use crate::state::AppState;

// per-route quotas live with the routes they guard
pub const LOGIN_LIMIT: RateLimitPolicy = RateLimitPolicy::per_minutes(15, 5);
pub const PROFILE_LIMIT: RateLimitPolicy = RateLimitPolicy::per_minutes(1, 30);
pub const CONTACT_LIMIT: RateLimitPolicy = RateLimitPolicy::per_minutes(10, 3);
pub const API_LIMIT: RateLimitPolicy = RateLimitPolicy::per_minutes(1, 100);

fn limited(
    state: &AppState,
    scope: &'static str,
    policy: RateLimitPolicy,
    routes: Router<AppState>,
) -> Router<AppState> {
    routes.route_layer(from_fn_with_state(RouteLimit::new(state, scope, policy), rate_limit))
}

pub fn app(state: AppState) -> Router {
    let login = limited(
        &state,
        "login",
        LOGIN_LIMIT,
        Router::new().route("/auth/login", post(login_handler)),
    );
    let profile = limited(
        &state,
        "profile",
        PROFILE_LIMIT,
        Router::new().route("/profile", get(get_profile_handler).put(update_profile_handler)),
    );
    let contact = limited(
        &state,
        "contact",
        CONTACT_LIMIT,
        Router::new().route("/contact", post(contact_handler)),
    );
    let public = limited(
        &state,
        "api",
        API_LIMIT,
        Router::new()
            .route("/services", get(list_services_handler))
            .route("/auth/logout", post(logout_handler)),
    );

    let api = Router::new()
        .merge(login)
        .merge(profile)
        .merge(contact)
        .merge(public)
        .method_not_allowed_fallback(method_not_allowed);

    // layers run bottom-up: trace -> metrics -> failure envelope -> panic guard -> handler
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(panic_to_failure))
        .layer(from_fn_with_state(state.config.profile, envelope_failures))
        .layer(from_fn(observe_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
