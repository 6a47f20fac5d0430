//! Database repository for user management operations.
//!
//! Doubles as the credential store consulted at login and by the
//! authentication gate.

use crate::database::models::{BranchId, CreateUser, Role, User, UserId};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.password_hash, u.role, u.branch_id,
           b.name AS branch_name, u.created_at, u.updated_at
    FROM users u
    LEFT JOIN branches b ON b.id = u.branch_id
"#;

/// Column values written by a user update.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    /// `None` keeps the stored hash.
    pub password_hash: Option<String>,
    pub role: Role,
    pub branch_id: Option<BranchId>,
}

/// Repository for user database operations.
///
/// Handles all persistence operations for the User entity,
/// maintaining the optional relationship with branches.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// # Arguments
    /// * `user` - CreateUser DTO containing the hashed credentials
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let id: UserId = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, role, branch_id)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.branch_id)
        .fetch_one(self.pool)
        .await?;

        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {id} vanished after insert"))
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their username.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.username = ?"))
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY u.id"))
            .fetch_all(self.pool)
            .await?;

        Ok(users)
    }

    /// Checks if username exists, optionally excluding a specific user.
    pub async fn username_exists(
        &self,
        username: &str,
        exclude_user_id: Option<UserId>,
    ) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? AND id != ?")
                .bind(username)
                .bind(exclude_user_id.unwrap_or(-1))
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    pub async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<Option<User>> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET username = ?,
                password_hash = COALESCE(?, password_hash),
                role = ?,
                branch_id = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.username)
        .bind(changes.password_hash.as_deref())
        .bind(changes.role)
        .bind(changes.branch_id)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }

        self.get_user_by_id(id).await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete_user(&self, id: UserId) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}
