use serde_json::{Value, json};

use crate::response::ApiResponse;

pub async fn health_handler() -> ApiResponse<Value> {
    ApiResponse::success(
        json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }),
        None,
    )
}
