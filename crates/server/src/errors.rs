use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Offending field of a rejected request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorDetails {
    pub field: String,
    pub code: String,
}

/// Error body shared by every endpoint: `{statusCode, error, message, details?}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<ErrorDetails>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }
    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, message) }
    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, message) }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn with_details(mut self, field: impl Into<String>, code: impl Into<String>) -> Self {
        self.details = Some(ErrorDetails { field: field.into(), code: code.into() });
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            error: self.status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => Self::bad_request(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Model(models::errors::ModelError::Validation(msg)) => Self::bad_request(msg),
            ServiceError::Db(msg) | ServiceError::Model(models::errors::ModelError::Db(msg)) => {
                error!(error = %msg, "database error");
                Self::internal()
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => Self::bad_request(msg),
            AuthError::Conflict => Self::bad_request(e.to_string()),
            AuthError::NotFound => Self::not_found(e.to_string()),
            AuthError::Unauthorized | AuthError::InvalidOtp | AuthError::InvalidToken => Self::unauthorized(e.to_string()),
            AuthError::Delivery(ref msg) => {
                error!(error = %msg, code = e.code(), "sms delivery failed");
                Self::new(StatusCode::BAD_GATEWAY, "Could not deliver OTP")
            }
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                error!(error = %e, code = e.code(), "auth failure");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(r: PathRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn body_shape_with_details() {
        let resp = JsonApiError::bad_request("pin must be exactly 4 characters")
            .with_details("pin", "invalid_length")
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["error"], "Bad Request");
        assert_eq!(json["details"]["field"], "pin");
    }

    #[tokio::test]
    async fn auth_errors_map_to_statuses() {
        assert_eq!(JsonApiError::from(AuthError::Conflict).status, StatusCode::BAD_REQUEST);
        assert_eq!(JsonApiError::from(AuthError::NotFound).status, StatusCode::NOT_FOUND);
        assert_eq!(JsonApiError::from(AuthError::InvalidOtp).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Delivery("x".into())).status, StatusCode::BAD_GATEWAY);
        let internal = JsonApiError::from(AuthError::Repository("boom".into()));
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.message.contains("boom"));
    }

    #[tokio::test]
    async fn service_errors_map_to_statuses() {
        let nf = JsonApiError::from(ServiceError::not_found("Wash"));
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "Wash not found");
        assert_eq!(JsonApiError::from(ServiceError::Validation("bad".into())).status, StatusCode::BAD_REQUEST);
        let json = body_json(JsonApiError::from(ServiceError::Db("x".into())).into_response()).await;
        assert_eq!(json["statusCode"], 500);
        assert!(json.get("details").is_none());
    }
}
