//! Database repository for branch management operations.
//!
//! Provides CRUD operations for academic branches, including the guarded
//! delete that refuses to remove a branch still owning students or
//! professors.

use crate::database::models::{Branch, BranchId};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const BRANCH_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Result of a guarded branch delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchDeletion {
    Deleted,
    NotFound,
    Occupied,
}

/// Repository for branch database operations.
pub struct BranchRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> BranchRepository<'a> {
    /// Creates a new BranchRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new branch in the database.
    ///
    /// # Returns
    /// The newly created Branch with all fields populated
    pub async fn create_branch(&self, name: &str, description: &str) -> Result<Branch> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "INSERT INTO branches (name, description) VALUES (?, ?) RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await?;

        Ok(branch)
    }

    /// Retrieves a branch by its identifier.
    ///
    /// # Returns
    /// `Some(Branch)` if found, `None` otherwise
    pub async fn get_branch_by_id(&self, id: BranchId) -> Result<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(branch)
    }

    /// Lists every branch ordered by name.
    pub async fn list_branches(&self) -> Result<Vec<Branch>> {
        let branches = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(branches)
    }

    pub async fn branch_exists(&self, id: BranchId) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM branches WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Checks if a branch name is taken, optionally ignoring one branch.
    pub async fn name_exists(&self, name: &str, exclude_id: Option<BranchId>) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM branches WHERE name = ? AND id != ?")
                .bind(name)
                .bind(exclude_id.unwrap_or(-1))
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Updates a branch's name and description.
    pub async fn update_branch(
        &self,
        id: BranchId,
        name: &str,
        description: &str,
    ) -> Result<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "UPDATE branches SET name = ?, description = ?, updated_at = ? WHERE id = ? \
             RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(branch)
    }

    /// Deletes a branch only if no student or user references it.
    ///
    /// The emptiness check and the delete are a single statement, so a
    /// concurrent insert into the branch either lands first (and blocks the
    /// delete) or fails its foreign key afterwards.
    pub async fn delete_branch_if_empty(&self, id: BranchId) -> Result<BranchDeletion> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM branches
            WHERE id = ?
              AND NOT EXISTS (SELECT 1 FROM students WHERE branch_id = ?)
              AND NOT EXISTS (SELECT 1 FROM users WHERE branch_id = ?)
            "#,
        )
        .bind(id)
        .bind(id)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let outcome = if deleted > 0 {
            BranchDeletion::Deleted
        } else {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM branches WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if exists > 0 {
                BranchDeletion::Occupied
            } else {
                BranchDeletion::NotFound
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }
}
