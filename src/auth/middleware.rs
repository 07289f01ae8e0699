use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::response::ApiResponse;
use crate::state::AppState;

pub struct AuthUser {
    pub user_id: String,
    pub token: String,
}

fn unauthorized(message: &str) -> (StatusCode, ApiResponse<()>) {
    (
        StatusCode::UNAUTHORIZED,
        ApiResponse::error(message, Some("UNAUTHORIZED"), None),
    )
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, ApiResponse<()>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| unauthorized("Invalid authorization header format"))?;

        let session = state
            .sessions
            .get(token)
            .ok_or_else(|| unauthorized("Invalid or expired session"))?;

        Ok(AuthUser {
            user_id: session.user_id,
            token: token.to_owned(),
        })
    }
}
