//! Module for core business logic services.
//!
//! Services validate requests, consult the access policy with the caller's
//! identity and orchestrate the repositories.

pub mod branch_service;
pub mod student_service;
pub mod user_service;
