use crate::api::common::ApiResponse;
use serde_json::{Value, json};

pub const SERVICE_NAME: &str = "Registrar Backend";

pub async fn root_handler() -> ApiResponse<Value> {
    ApiResponse::success(
        json!({
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the Registrar API",
    )
}

/// Liveness probe. Does not touch the database.
pub async fn health_handler() -> ApiResponse<Value> {
    ApiResponse::success(
        json!({
            "status": "UP",
            "service": SERVICE_NAME,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }),
        "Service is healthy",
    )
}
