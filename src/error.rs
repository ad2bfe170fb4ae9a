// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::services::pipeline_service::ImportError;
use crate::services::viberate::ProviderError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error, `details` carries the caught error's message
    InternalServerError {
        message: String,
        details: Option<String>,
    },

    // 502 Bad Gateway (external service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });

        if let ApiError::InternalServerError { details: Some(details), .. } = self {
            body["details"] = Value::String(details.clone());
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_authenticated() -> Self {
        ApiError::Unauthorized("Not authenticated".to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            details: None,
        }
    }

    /// 500 with the caught error's message exposed as `details`
    pub fn internal_with_details(message: impl Into<String>, details: impl std::fmt::Display) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::PermissionDenied(msg) => {
                tracing::warn!("Row ownership check failed: {}", msg);
                ApiError::unauthorized("Unauthorized")
            }
            DatabaseError::ServiceRoleUnavailable => {
                ApiError::service_unavailable("Service credentials are not configured")
            }
            DatabaseError::ConfigMissing(name) => {
                tracing::error!("Database configuration missing: {}", name);
                ApiError::service_unavailable("Database is not configured")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_with_details("Internal server error", other)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::not_authenticated(),
            AuthError::InvalidToken(msg) => {
                tracing::debug!("Rejected session token: {}", msg);
                ApiError::not_authenticated()
            }
            AuthError::NotConfigured(what) => {
                tracing::error!("Auth not configured: {}", what);
                ApiError::service_unavailable("Authentication is not configured")
            }
            AuthError::Exchange(msg) => {
                tracing::warn!("Auth code exchange failed: {}", msg);
                ApiError::unauthorized("Unauthorized")
            }
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured => {
                ApiError::service_unavailable("Artist data provider is not configured")
            }
            ProviderError::NotFound(msg) => ApiError::not_found(msg),
            other => {
                tracing::error!("Artist data provider error: {}", other);
                ApiError::bad_gateway(other.to_string())
            }
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::EmptyFile => ApiError::bad_request("File is empty"),
            ImportError::MissingColumns(columns) => ApiError::bad_request(format!(
                "CSV is missing required columns: {}",
                columns.join(", ")
            )),
            ImportError::Csv(msg) => ApiError::bad_request(format!("Could not read CSV: {}", msg)),
            ImportError::MissingArtistLink => {
                ApiError::not_found("No Viberate artist is linked to this profile")
            }
            ImportError::Database(e) => e.into(),
            ImportError::Provider(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
