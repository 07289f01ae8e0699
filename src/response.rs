use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

// absent optional fields are omitted, never null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Uniform body of every API response.
///
/// Serializes as `{"success": true, "data": .., "pagination": ..}` or
/// `{"success": false, "error": {..}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success {
        data: T,
        pagination: Option<Pagination>,
    },
    Error(ErrorBody),
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, pagination: Option<Pagination>) -> Self {
        ApiResponse::Success { data, pagination }
    }

    pub fn error(
        message: impl Into<String>,
        code: Option<&str>,
        details: Option<Value>,
    ) -> Self {
        ApiResponse::Error(ErrorBody {
            message: message.into(),
            code: code.map(str::to_owned),
            details,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ApiResponse::Success { data, pagination } => {
                let len = if pagination.is_some() { 3 } else { 2 };
                let mut state = serializer.serialize_struct("ApiResponse", len)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                match pagination {
                    Some(pagination) => state.serialize_field("pagination", pagination)?,
                    None => state.skip_field("pagination")?,
                }
                state.end()
            }
            ApiResponse::Error(error) => {
                let mut state = serializer.serialize_struct("ApiResponse", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

// status defaults to 200; pair with a StatusCode for anything else
impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_without_pagination() {
        let body = serde_json::to_value(ApiResponse::success(json!({"x": 1}), None)).unwrap();
        assert_eq!(body, json!({"success": true, "data": {"x": 1}}));
    }

    #[test]
    fn success_with_pagination() {
        let page = Pagination::new(2, 10, 35);
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2], Some(page))).unwrap();
        assert_eq!(body["pagination"]["totalPages"], 4);
        assert_eq!(body["pagination"]["page"], 2);
    }

    #[test]
    fn error_omits_missing_fields() {
        let body = serde_json::to_value(ApiResponse::<()>::error("bad", Some("E1"), None)).unwrap();
        assert_eq!(body, json!({"success": false, "error": {"message": "bad", "code": "E1"}}));
    }

    #[test]
    fn empty_code_is_kept() {
        let body = serde_json::to_value(ApiResponse::<()>::error("bad", Some(""), None)).unwrap();
        assert_eq!(body["error"]["code"], "");
    }

    #[test]
    fn zero_limit_has_no_pages() {
        assert_eq!(Pagination::new(1, 0, 10).total_pages, 0);
    }
}
