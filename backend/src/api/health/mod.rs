//! Service banner and liveness endpoints.

pub mod handlers;
pub mod routes;
