//! Defines the HTTP routes specifically for authentication.
//!
//! These are designed to be nested under `/api/auth` in the main router.

use crate::auth::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
