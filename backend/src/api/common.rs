//! Response envelope and error mapping for API handlers.
//!
//! Every endpoint, successful or not, answers with the same JSON shape:
//! - `success`: whether the request succeeded
//! - `message`: human-readable message
//! - `data`: payload, omitted on failure
//! - `statusCode`: the HTTP status, repeated in the body
//!
//! # Error Handling Flow
//! 1. Service layer returns domain-specific `ServiceError`
//! 2. Handlers wrap it in `ApiError`
//! 3. `ApiError::into_response` picks the status and renders the envelope

use crate::errors::ServiceError;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// HTTP status code of the response
    pub status_code: u16,
}

impl<T> ApiResponse<T> {
    /// Create a successful `200 OK` response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    /// Create a successful `201 Created` response
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            status_code: status.as_u16(),
        }
    }
}

impl ApiResponse<()> {
    /// Create a successful response without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            status_code: StatusCode::OK.as_u16(),
        }
    }

    /// Create an error response
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            status_code: status.as_u16(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Handler error: a `ServiceError` rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        ApiError(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ServiceError::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(ServiceError::validation(rejection.body_text()))
    }
}

/// Converts ServiceError to the HTTP status and client-facing message
pub fn service_error_to_http(error: ServiceError) -> (StatusCode, String) {
    match error {
        ServiceError::Validation { message } => (StatusCode::BAD_REQUEST, message),
        ServiceError::NotFound { entity, identifier } => (
            StatusCode::NOT_FOUND,
            format!("{entity} not found: {identifier}"),
        ),
        ServiceError::AlreadyExists { entity, identifier } => (
            StatusCode::CONFLICT,
            format!("{entity} already exists: {identifier}"),
        ),
        ServiceError::PermissionDenied { message } => (StatusCode::FORBIDDEN, message),
        ServiceError::InvalidOperation { message } => (StatusCode::BAD_REQUEST, message),
        error @ (ServiceError::Unauthenticated
        | ServiceError::InvalidCredentials
        | ServiceError::TokenRevoked) => (StatusCode::UNAUTHORIZED, error.to_string()),
        ServiceError::Database { source } => {
            tracing::error!("Database error: {source:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {message}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = service_error_to_http(self.0);
        ApiResponse::error(status, message).into_response()
    }
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor whose rejections use the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(error: ServiceError) -> (StatusCode, Value) {
        let response = ApiError(error).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let cases = [
            (ServiceError::validation("bad"), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("Branch", 7), StatusCode::NOT_FOUND),
            (ServiceError::already_exists("User", "profA"), StatusCode::CONFLICT),
            (ServiceError::permission_denied("no"), StatusCode::FORBIDDEN),
            (ServiceError::invalid_operation("occupied"), StatusCode::BAD_REQUEST),
            (ServiceError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::TokenRevoked, StatusCode::UNAUTHORIZED),
            (ServiceError::internal_error("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let (status, body) = render(error).await;
            assert_eq!(status, expected);
            assert_eq!(body["success"], false);
            assert_eq!(body["statusCode"], expected.as_u16());
            assert!(body.get("data").is_none());
        }
    }

    #[tokio::test]
    async fn test_storage_details_are_not_exposed() {
        let error = ServiceError::Database {
            source: anyhow::anyhow!("disk I/O error at /var/lib/registrar.db"),
        };
        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_revoked_message() {
        let (_, body) = render(ServiceError::TokenRevoked).await;
        assert_eq!(
            body["message"],
            "Token has been invalidated. Please login again."
        );
    }

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::created(42, "Created")).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], 42);
        assert_eq!(body["statusCode"], 201);
        assert_eq!(body["message"], "Created");
    }
}
