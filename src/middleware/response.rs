use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that adds the `success` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    /// Merge the data's fields next to `success` instead of nesting under `data`
    pub inline: bool,
}

impl<T: Serialize> ApiResponse<T> {
    /// `{"success": true, "data": ...}` with 200
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            inline: false,
        }
    }

    /// `{"success": true, ...fields}` with 200. `data` must serialize to an object.
    pub fn inline(data: T) -> Self {
        Self {
            data,
            status_code: None,
            inline: true,
        }
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = Some(status_code);
        self
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
                        "error": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = match (self.inline, data_value) {
            (true, Value::Object(mut fields)) => {
                fields.insert("success".to_string(), Value::Bool(true));
                Value::Object(fields)
            }
            (_, data) => json!({
                "success": true,
                "data": data
            }),
        };

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
