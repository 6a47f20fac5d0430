//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database, together with the validated request payloads that
//! create or change them. Row models are serialized directly in API
//! responses, so secrets are marked `skip_serializing`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

pub type BranchId = i64;
pub type StudentId = i64;
pub type UserId = i64;

/// Account role. Stored as upper-case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Professor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Professor => "PROFESSOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BranchRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Branch name must be between 2 and 100 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 10,
        max = 500,
        message = "Description must be between 10 and 500 characters"
    ))]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Branch name must be between 2 and 100 characters"
    ))]
    pub name: Option<String>,

    #[validate(length(
        min = 10,
        max = 500,
        message = "Description must be between 10 and 500 characters"
    ))]
    pub description: Option<String>,
}

/// Student row joined with the owning branch's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub gender: Gender,
    pub branch_id: BranchId,
    pub branch_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Email should be valid"))]
    pub email: String,

    #[validate(range(min = 15, max = 60, message = "Age must be between 15 and 60"))]
    pub age: i32,

    pub gender: Gender,

    pub branch_id: BranchId,
}

/// Partial student update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Email should be valid"))]
    pub email: Option<String>,

    #[validate(range(min = 15, max = 60, message = "Age must be between 15 and 60"))]
    pub age: Option<i32>,

    pub gender: Option<Gender>,

    pub branch_id: Option<BranchId>,
}

/// Column values for a student insert, after validation and policy checks.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub gender: Gender,
    pub branch_id: BranchId,
}

/// User row joined with the assigned branch's name, if any.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub branch_id: Option<BranchId>,
    pub branch_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Role,

    pub branch_id: Option<BranchId>,
}

#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: Option<String>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,

    pub role: Role,

    pub branch_id: Option<BranchId>,
}

fn trim(value: String) -> String {
    value.trim().to_string()
}

// Free-text fields are trimmed before validation, so length limits apply to
// what is stored.

impl BranchRequest {
    pub fn trimmed(self) -> Self {
        BranchRequest {
            name: trim(self.name),
            description: trim(self.description),
        }
    }
}

impl UpdateBranchRequest {
    pub fn trimmed(self) -> Self {
        UpdateBranchRequest {
            name: self.name.map(trim),
            description: self.description.map(trim),
        }
    }
}

impl StudentRequest {
    pub fn trimmed(self) -> Self {
        StudentRequest {
            name: trim(self.name),
            email: trim(self.email),
            ..self
        }
    }
}

impl UpdateStudentRequest {
    pub fn trimmed(self) -> Self {
        UpdateStudentRequest {
            name: self.name.map(trim),
            email: self.email.map(trim),
            ..self
        }
    }
}

impl RegisterRequest {
    pub fn trimmed(self) -> Self {
        RegisterRequest {
            username: trim(self.username),
            ..self
        }
    }
}

impl UpdateUserRequest {
    pub fn trimmed(self) -> Self {
        UpdateUserRequest {
            username: self.username.map(trim),
            ..self
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("branch_id", &self.branch_id)
            .finish()
    }
}

impl fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("branch_id", &self.branch_id)
            .finish()
    }
}

/// Column values for a user insert. Only ever holds a hash.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub branch_id: Option<BranchId>,
}
