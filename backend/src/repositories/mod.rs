//! Data access layer. One repository per table, each borrowing the pool.

pub mod branch_repository;
pub mod student_repository;
pub mod user_repository;
