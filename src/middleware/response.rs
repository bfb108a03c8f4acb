use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that adds the `{"success": true, ...}` envelope.
/// Object payloads are merged into the envelope at the top level, so a
/// handler returning `{"documents": ...}` produces
/// `{"success": true, "documents": ...}` on the wire.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = match data_value {
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len() + 1);
                out.insert("success".to_string(), Value::Bool(true));
                for (k, v) in map {
                    out.insert(k, v);
                }
                Value::Object(out)
            }
            Value::Null => json!({ "success": true }),
            other => json!({ "success": true, "data": other }),
        };

        (status, Json(envelope)).into_response()
    }
}

/// Handler result type: success envelope or `ApiError`
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_payload_is_merged() {
        let resp = ApiResponse::success(json!({ "documents": [] }));
        let v = serde_json::to_value(&resp.data).unwrap();
        assert!(v.get("documents").is_some());
    }
}
