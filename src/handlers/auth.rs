use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::AuthUser;
use crate::error::Failure;
use crate::models::{LoginRequest, LoginResponse, LogoutResponse};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation::Validated;

pub async fn login_handler(
    State(state): State<AppState>,
    Validated(body): Validated<LoginRequest>,
) -> Result<Response, Failure> {
    let users = state.users.clone();
    let email = body.email.clone();
    let password = body.password;

    let profile = tokio::task::spawn_blocking(move || users.authenticate(&email, &password))
        .await
        .map_err(anyhow::Error::from)??;

    let Some(user) = profile else {
        tracing::warn!(email = %body.email, "failed login attempt");
        return Ok((
            StatusCode::UNAUTHORIZED,
            ApiResponse::<()>::error("Invalid credentials", Some("INVALID_CREDENTIALS"), None),
        )
            .into_response());
    };

    let token = state.sessions.create(&user.id);
    let ttl = chrono::Duration::from_std(state.sessions.ttl()).map_err(anyhow::Error::from)?;
    let expires_at = (chrono::Utc::now() + ttl).to_rfc3339();
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse::success(
        LoginResponse {
            token,
            expires_at,
            user,
        },
        None,
    )
    .into_response())
}

pub async fn logout_handler(
    user: AuthUser,
    State(state): State<AppState>,
) -> ApiResponse<LogoutResponse> {
    let logged_out = state.sessions.revoke(&user.token);
    tracing::info!(user_id = %user.user_id, "user logged out");
    ApiResponse::success(LogoutResponse { logged_out }, None)
}
