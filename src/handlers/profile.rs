use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::AuthUser;
use crate::models::ProfileUpdate;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation::Validated;

fn profile_missing() -> Response {
    (
        StatusCode::NOT_FOUND,
        ApiResponse::<()>::error("Profile not found", Some("NOT_FOUND"), None),
    )
        .into_response()
}

pub async fn get_profile_handler(user: AuthUser, State(state): State<AppState>) -> Response {
    match state.users.profile(&user.user_id) {
        Some(profile) => ApiResponse::success(profile, None).into_response(),
        None => profile_missing(),
    }
}

pub async fn update_profile_handler(
    user: AuthUser,
    State(state): State<AppState>,
    Validated(update): Validated<ProfileUpdate>,
) -> Response {
    let updated = state.users.update_profile(&user.user_id, |record| {
        if let Some(name) = update.name {
            record.name = name.trim().to_owned();
        }
        // empty strings clear optional fields
        if let Some(company) = update.company {
            record.company = non_empty(company);
        }
        if let Some(phone) = update.phone {
            record.phone = non_empty(phone);
        }
        if let Some(bio) = update.bio {
            record.bio = non_empty(bio);
        }
    });

    let Some(profile) = updated else {
        return profile_missing();
    };
    tracing::info!(user_id = %user.user_id, "profile updated");
    ApiResponse::success(profile, None).into_response()
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
