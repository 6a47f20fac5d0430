//! Student management API endpoints, including the public lookup by email.

pub mod handlers;
pub mod routes;
