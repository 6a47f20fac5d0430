//! Handler functions for student API endpoints.

use crate::api::common::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::auth::middleware::RequireIdentity;
use crate::database::models::{
    BranchId, Student, StudentId, StudentRequest, UpdateStudentRequest,
};
use crate::state::AppState;
use axum::extract::Extension;

#[axum::debug_handler]
pub async fn create_student(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiJson(payload): ApiJson<StudentRequest>,
) -> ApiResult<Student> {
    let student = state
        .student_service()
        .create_student(&identity, payload)
        .await?;
    Ok(ApiResponse::created(student, "Student created successfully"))
}

#[axum::debug_handler]
pub async fn list_students(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> ApiResult<Vec<Student>> {
    let students = state.student_service().list_students(&identity).await?;
    Ok(ApiResponse::success(students, "Students retrieved successfully"))
}

#[axum::debug_handler]
pub async fn list_students_by_branch(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(branch_id): ApiPath<BranchId>,
) -> ApiResult<Vec<Student>> {
    let students = state
        .student_service()
        .list_students_by_branch(&identity, branch_id)
        .await?;
    Ok(ApiResponse::success(students, "Students retrieved successfully"))
}

#[axum::debug_handler]
pub async fn get_student(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<StudentId>,
) -> ApiResult<Student> {
    let student = state.student_service().get_student(&identity, id).await?;
    Ok(ApiResponse::success(student, "Student retrieved successfully"))
}

#[axum::debug_handler]
pub async fn update_student(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<StudentId>,
    ApiJson(payload): ApiJson<UpdateStudentRequest>,
) -> ApiResult<Student> {
    let student = state
        .student_service()
        .update_student(&identity, id, payload)
        .await?;
    Ok(ApiResponse::success(student, "Student updated successfully"))
}

#[axum::debug_handler]
pub async fn delete_student(
    Extension(state): Extension<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(id): ApiPath<StudentId>,
) -> ApiResult<()> {
    state.student_service().delete_student(&identity, id).await?;
    Ok(ApiResponse::message("Student deleted successfully"))
}

/// Unauthenticated lookup, served under a public path.
#[axum::debug_handler]
pub async fn get_student_by_email(
    Extension(state): Extension<AppState>,
    ApiPath(email): ApiPath<String>,
) -> ApiResult<Student> {
    let student = state
        .student_service()
        .get_student_by_email_public(&email)
        .await?;
    Ok(ApiResponse::success(student, "Student retrieved successfully"))
}
