//! Handler functions for user account API endpoints.

use crate::api::common::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::auth::middleware::RequireIdentity;
use crate::database::models::{RegisterRequest, UpdateUserRequest, User, UserId};
use crate::state::AppState;
use axum::extract::Extension;

#[axum::debug_handler]
pub async fn register_user(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<User> {
    let user = state.user_service().register(&identity, payload).await?;
    Ok(ApiResponse::created(user, "User registered successfully"))
}

#[axum::debug_handler]
pub async fn list_users(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> ApiResult<Vec<User>> {
    let users = state.user_service().list_users(&identity).await?;
    Ok(ApiResponse::success(users, "Users retrieved successfully"))
}

#[axum::debug_handler]
pub async fn get_user(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<User> {
    let user = state.user_service().get_user(&identity, id).await?;
    Ok(ApiResponse::success(user, "User retrieved successfully"))
}

#[axum::debug_handler]
pub async fn update_user(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<User> {
    let user = state
        .user_service()
        .update_user(&identity, id, payload)
        .await?;
    Ok(ApiResponse::success(user, "User updated successfully"))
}

#[axum::debug_handler]
pub async fn delete_user(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<()> {
    state.user_service().delete_user(&identity, id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
