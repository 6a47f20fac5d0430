//! Authentication and authorization.
//!
//! Token issuing and revocation, the per-request authentication gate, and
//! the role and branch access policy.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod revocation;
pub mod routes;
pub mod service;
