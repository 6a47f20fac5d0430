//! Handler functions for branch management API endpoints.

use crate::api::common::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::auth::middleware::RequireIdentity;
use crate::database::models::{Branch, BranchId, BranchRequest, UpdateBranchRequest};
use crate::state::AppState;
use axum::extract::Extension;

#[axum::debug_handler]
pub async fn create_branch(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiJson(payload): ApiJson<BranchRequest>,
) -> ApiResult<Branch> {
    let branch = state
        .branch_service()
        .create_branch(&identity, payload)
        .await?;
    Ok(ApiResponse::created(branch, "Branch created successfully"))
}

#[axum::debug_handler]
pub async fn list_branches(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> ApiResult<Vec<Branch>> {
    let branches = state.branch_service().list_branches(&identity).await?;
    Ok(ApiResponse::success(branches, "Branches retrieved successfully"))
}

#[axum::debug_handler]
pub async fn get_branch(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<BranchId>,
) -> ApiResult<Branch> {
    let branch = state.branch_service().get_branch(&identity, id).await?;
    Ok(ApiResponse::success(branch, "Branch retrieved successfully"))
}

#[axum::debug_handler]
pub async fn update_branch(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<BranchId>,
    ApiJson(payload): ApiJson<UpdateBranchRequest>,
) -> ApiResult<Branch> {
    let branch = state
        .branch_service()
        .update_branch(&identity, id, payload)
        .await?;
    Ok(ApiResponse::success(branch, "Branch updated successfully"))
}

#[axum::debug_handler]
pub async fn delete_branch(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<BranchId>,
) -> ApiResult<()> {
    state.branch_service().delete_branch(&identity, id).await?;
    Ok(ApiResponse::message("Branch deleted successfully"))
}
