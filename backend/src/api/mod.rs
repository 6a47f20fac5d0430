//! Central module for organizing the application's HTTP API.
//!
//! Each domain contributes a router; `build_app` nests them, installs the
//! authentication gate and shares the `AppState`.

pub mod branch;
pub mod common;
pub mod health;
pub mod student;
pub mod user;

use crate::auth::{middleware::authentication_gate, routes::auth_router};
use crate::state::AppState;
use axum::{Extension, Router, middleware};

/// Assembles the full application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(health::routes::health_router())
        .nest("/api/auth", auth_router())
        .nest("/api/branches", branch::routes::branch_router())
        .nest("/api/students", student::routes::student_router())
        .nest("/api/users", user::routes::user_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_gate,
        ))
        .layer(Extension(state))
}
