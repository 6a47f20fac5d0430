//! Data structures for authentication-related entities.
//!
//! This module defines the login payloads, the resolved `Identity` of an
//! authenticated caller and the per-request `AuthContext` the gate attaches.

use crate::database::models::{BranchId, Role, User, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Login request payload
#[derive(Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login response containing the bearer token and a display projection of
/// the caller's role and branch.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<BranchId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// What an identity is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    Admin,
    Professor { branch_id: BranchId },
    /// A professor record with no branch reference. Every branch-scoped
    /// action is refused for it.
    UnassignedProfessor,
}

/// An authenticated principal, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub scope: AccessScope,
}

impl Identity {
    pub fn admin(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            scope: AccessScope::Admin,
        }
    }

    pub fn professor(user_id: UserId, username: impl Into<String>, branch_id: BranchId) -> Self {
        Self {
            user_id,
            username: username.into(),
            scope: AccessScope::Professor { branch_id },
        }
    }

    pub fn unassigned_professor(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            scope: AccessScope::UnassignedProfessor,
        }
    }

    pub fn role(&self) -> Role {
        match self.scope {
            AccessScope::Admin => Role::Admin,
            AccessScope::Professor { .. } | AccessScope::UnassignedProfessor => Role::Professor,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.scope, AccessScope::Admin)
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        match (user.role, user.branch_id) {
            (Role::Admin, _) => Identity::admin(user.id, &user.username),
            (Role::Professor, Some(branch_id)) => {
                Identity::professor(user.id, &user.username, branch_id)
            }
            (Role::Professor, None) => Identity::unassigned_professor(user.id, &user.username),
        }
    }
}

/// Outcome of the authentication gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Anonymous,
    Authenticated(Identity),
}

impl AuthContext {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::Authenticated(identity) => Some(identity),
        }
    }
}
