//! Global application error types.
//!
//! This module defines the error taxonomy shared by the service layer, the
//! authentication core and the HTTP boundary. Every variant maps to exactly
//! one response status in `api::common::ApiError`.

use thiserror::Error;

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    /// No usable identity on a request that needs one.
    #[error("Authentication required")]
    Unauthenticated,

    /// Login failure. The message never says which half was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token has been invalidated. Please login again.")]
    TokenRevoked,

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl ToString) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database {
            source: error.into(),
        }
    }
}

/// Flattens `validator` field errors into a single `Validation` error.
pub fn validation_failure(errors: validator::ValidationErrors) -> ServiceError {
    let mut error_messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error.message.as_ref().unwrap_or(&"Invalid value".into())
                )
            })
        })
        .collect();
    error_messages.sort();

    ServiceError::validation(error_messages.join(", "))
}
