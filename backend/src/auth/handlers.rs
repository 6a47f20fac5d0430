//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse login and logout requests and delegate to
//! `auth::service` for the core logic.

use crate::api::common::{ApiJson, ApiResponse, ApiResult};
use crate::auth::middleware::{RequireIdentity, bearer_token};
use crate::auth::models::{LoginRequest, LoginResponse};
use crate::database::models::User;
use crate::state::AppState;
use axum::{extract::Extension, http::HeaderMap};

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(state): Extension<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = state.auth_service().login(payload).await?;
    Ok(ApiResponse::success(response, "Login successful"))
}

/// Handle logout. Revokes the bearer token the caller authenticated with.
#[axum::debug_handler]
pub async fn logout(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    headers: HeaderMap,
) -> ApiResponse<()> {
    tracing::debug!(username = %identity.username, "Logout requested");
    state.auth_service().logout(bearer_token(&headers)).await;
    ApiResponse::message("Logout successful")
}

/// Profile of the authenticated caller
#[axum::debug_handler]
pub async fn me(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> ApiResult<User> {
    let user = state.user_service().me(&identity).await?;
    Ok(ApiResponse::success(user, "Current user retrieved"))
}
