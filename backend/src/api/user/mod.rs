//! Module for user account API endpoints.
//!
//! Account registration and management are restricted to admins.

pub mod handlers;
pub mod routes;
