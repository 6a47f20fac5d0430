//! Defines the HTTP routes for user account management.

use super::handlers::{delete_user, get_user, list_users, register_user, update_user};
use axum::{Router, routing::get};

pub fn user_router() -> Router {
    Router::new()
        .route("/", get(list_users).post(register_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}
