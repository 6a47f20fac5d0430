//! Role and branch based access decisions.
//!
//! Everything here is a pure function of the caller's `Identity` and the
//! ownership facts the service layer looked up. No IO, no ambient state.
//!
//! | Role                 | Branch                  | Student                  | User accounts |
//! |----------------------|-------------------------|--------------------------|---------------|
//! | admin                | any                     | any                      | full          |
//! | professor            | read own only           | any action, own branch   | none          |
//! | unassigned professor | none, distinct error    | none, distinct error     | none          |

use crate::auth::models::{AccessScope, Identity};
use crate::database::models::BranchId;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "access",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Professor without a branch reference.
    Unassigned { action: Action, resource: &'static str },
    /// Right role, wrong branch.
    OutsideBranch { action: Action, resource: &'static str },
    /// Action not granted to the role at all.
    RoleNotPermitted { action: Action, resource: &'static str },
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyError::Unassigned { action, resource } => write!(
                f,
                "Professor must be assigned to a branch to {} {}",
                action.verb(),
                resource
            ),
            PolicyError::OutsideBranch { action, resource } => write!(
                f,
                "You can only {} {} in your own branch",
                action.verb(),
                resource
            ),
            PolicyError::RoleNotPermitted { action, resource } => {
                write!(f, "Only admin can {} {}", action.verb(), resource)
            }
        }
    }
}

impl std::error::Error for PolicyError {}

impl From<PolicyError> for ServiceError {
    fn from(error: PolicyError) -> Self {
        ServiceError::permission_denied(error.to_string())
    }
}

/// Which rows a list operation may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Branch(BranchId),
}

/// Decides an action on a branch record.
pub fn authorize_branch(
    identity: &Identity,
    action: Action,
    branch_id: Option<BranchId>,
) -> Result<(), PolicyError> {
    const RESOURCE: &str = "branches";

    match identity.scope {
        AccessScope::Admin => Ok(()),
        AccessScope::UnassignedProfessor => Err(PolicyError::Unassigned {
            action,
            resource: RESOURCE,
        }),
        AccessScope::Professor { branch_id: own } => match action {
            Action::Read if branch_id.is_none_or(|id| id == own) => Ok(()),
            Action::Read => Err(PolicyError::OutsideBranch {
                action,
                resource: RESOURCE,
            }),
            _ => Err(PolicyError::RoleNotPermitted {
                action,
                resource: RESOURCE,
            }),
        },
    }
}

/// Decides an action on a student owned by `student_branch`.
pub fn authorize_student(
    identity: &Identity,
    action: Action,
    student_branch: BranchId,
) -> Result<(), PolicyError> {
    const RESOURCE: &str = "students";

    match identity.scope {
        AccessScope::Admin => Ok(()),
        AccessScope::UnassignedProfessor => Err(PolicyError::Unassigned {
            action,
            resource: RESOURCE,
        }),
        AccessScope::Professor { branch_id } if branch_id == student_branch => Ok(()),
        AccessScope::Professor { .. } => Err(PolicyError::OutsideBranch {
            action,
            resource: RESOURCE,
        }),
    }
}

/// Decides an action on user accounts. Admin only.
pub fn authorize_user_admin(identity: &Identity, action: Action) -> Result<(), PolicyError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(PolicyError::RoleNotPermitted {
            action,
            resource: "users",
        })
    }
}

/// Rows visible to `identity` when listing students or branches.
pub fn listing_scope(identity: &Identity, resource: &'static str) -> Result<ListScope, PolicyError> {
    match identity.scope {
        AccessScope::Admin => Ok(ListScope::All),
        AccessScope::Professor { branch_id } => Ok(ListScope::Branch(branch_id)),
        AccessScope::UnassignedProfessor => Err(PolicyError::Unassigned {
            action: Action::Read,
            resource,
        }),
    }
}

/// Branch reassignment carried by a student update, after role filtering.
///
/// Professors cannot move students; their requested branch is dropped
/// rather than rejected.
pub fn student_update_branch(
    identity: &Identity,
    requested: Option<BranchId>,
) -> Option<BranchId> {
    if identity.is_admin() { requested } else { None }
}
