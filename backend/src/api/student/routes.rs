//! Defines the HTTP routes for student management.
//!
//! `/public/email/{email}` must stay covered by the public-path list; the
//! other routes require an authenticated caller.

use super::handlers::*;
use axum::{Router, routing::get};

pub fn student_router() -> Router {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/branch/{branch_id}", get(list_students_by_branch))
        .route("/public/email/{email}", get(get_student_by_email))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}
