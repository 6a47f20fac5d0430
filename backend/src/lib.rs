//! Registrar backend: branch, student and account management behind
//! bearer-token authentication with role and branch scoped access.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;

pub use api::build_app;
pub use state::AppState;
