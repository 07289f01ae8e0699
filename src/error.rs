use std::any::Any;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::DeploymentProfile;
use crate::metrics::FAILURES;
use crate::response::ApiResponse;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

const VALIDATION_MESSAGE: &str = "Validation failed";
const INTERNAL_MESSAGE: &str = "Internal server error";
const UNKNOWN_MESSAGE: &str = "An unknown error occurred";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn to_value(&self) -> Value {
        json!({ "field": self.field, "message": self.message })
    }
}

/// Everything a handler can fail with.
///
/// Handlers never build their own error envelopes for these; they return
/// `Err(Failure)` and [`envelope_failures`] renders it once for all routes.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("validation failed ({} violation(s))", .0.len())]
    Validation(Vec<FieldViolation>),
    #[error(transparent)]
    Runtime(#[from] anyhow::Error),
    #[error("unknown failure: {0}")]
    Unknown(String),
}

impl Failure {
    pub fn code(&self) -> &'static str {
        match self {
            Failure::Validation(_) => VALIDATION_ERROR,
            Failure::Runtime(_) => INTERNAL_ERROR,
            Failure::Unknown(_) => UNKNOWN_ERROR,
        }
    }
}

pub fn map_failure_to_response(
    failure: &Failure,
    profile: DeploymentProfile,
) -> (StatusCode, ApiResponse<()>) {
    match failure {
        Failure::Validation(violations) => {
            let details = Value::Array(violations.iter().map(FieldViolation::to_value).collect());
            (
                StatusCode::BAD_REQUEST,
                ApiResponse::error(VALIDATION_MESSAGE, Some(VALIDATION_ERROR), Some(details)),
            )
        }
        Failure::Runtime(err) => {
            let message = match profile {
                DeploymentProfile::Production => INTERNAL_MESSAGE.to_string(),
                DeploymentProfile::Development => err.to_string(),
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error(message, Some(INTERNAL_ERROR), None),
            )
        }
        Failure::Unknown(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiResponse::error(UNKNOWN_MESSAGE, Some(UNKNOWN_ERROR), None),
        ),
    }
}

// carried in response extensions until envelope_failures picks it up
#[derive(Clone)]
struct PendingFailure(Arc<Failure>);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        // production rendering until the middleware knows the real profile
        let (status, body) = map_failure_to_response(&self, DeploymentProfile::Production);
        let mut response = (status, body).into_response();
        response
            .extensions_mut()
            .insert(PendingFailure(Arc::new(self)));
        response
    }
}

pub async fn envelope_failures(
    State(profile): State<DeploymentProfile>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let mut response = next.run(req).await;

    let Some(PendingFailure(failure)) = response.extensions_mut().remove::<PendingFailure>() else {
        return response;
    };

    FAILURES.with_label_values(&[failure.code()]).inc();
    match failure.as_ref() {
        Failure::Validation(violations) => {
            tracing::debug!(%method, path = %path, violations = violations.len(), "request rejected by validation");
        }
        Failure::Runtime(err) => tracing::error!(%method, path = %path, "handler failed: {err:#}"),
        Failure::Unknown(detail) => tracing::error!(%method, path = %path, "handler failed: {detail}"),
    }

    // keep headers set further in (rate limit counters, tracing ids)
    let (mut parts, _) = response.into_parts();
    let (rendered, body) = map_failure_to_response(&failure, profile)
        .into_response()
        .into_parts();
    parts.status = rendered.status;
    parts.headers.remove(CONTENT_LENGTH);
    parts.headers.extend(rendered.headers);
    Response::from_parts(parts, body)
}

// CatchPanicLayer hook: a panicking handler becomes an unknown failure
pub fn panic_to_failure(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic with non-string payload".to_string()
    };
    Failure::Unknown(detail).into_response()
}

pub async fn route_not_found() -> (StatusCode, ApiResponse<()>) {
    (
        StatusCode::NOT_FOUND,
        ApiResponse::error("Not found", Some("NOT_FOUND"), None),
    )
}

pub async fn method_not_allowed() -> (StatusCode, ApiResponse<()>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        ApiResponse::error("Method not allowed", Some("METHOD_NOT_ALLOWED"), None),
    )
}
