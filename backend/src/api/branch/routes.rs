//! Defines the HTTP routes for branch management.

use super::handlers::{create_branch, delete_branch, get_branch, list_branches, update_branch};
use axum::{Router, routing::get};

pub fn branch_router() -> Router {
    Router::new()
        .route("/", get(list_branches).post(create_branch))
        .route(
            "/{id}",
            get(get_branch).put(update_branch).delete(delete_branch),
        )
}
