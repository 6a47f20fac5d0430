//! Branch business logic service.
//!
//! Admins manage branches; professors may only look at their own.

use crate::auth::models::Identity;
use crate::auth::policy::{self, Action, ListScope};
use crate::database::models::{Branch, BranchId, BranchRequest, UpdateBranchRequest};
use crate::errors::{ServiceError, ServiceResult, validation_failure};
use crate::repositories::branch_repository::{BranchDeletion, BranchRepository};
use sqlx::SqlitePool;
use validator::Validate;

/// Service layer for branch operations.
pub struct BranchService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> BranchService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a branch with a unique, trimmed name.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Non-admin callers
    /// - Validation failures
    /// - Duplicate branch names
    pub async fn create_branch(
        &self,
        identity: &Identity,
        request: BranchRequest,
    ) -> ServiceResult<Branch> {
        policy::authorize_branch(identity, Action::Create, None)?;
        let request = request.trimmed();
        request.validate().map_err(validation_failure)?;

        let repo = BranchRepository::new(self.pool);
        if repo.name_exists(&request.name, None).await? {
            return Err(ServiceError::already_exists("Branch", &request.name));
        }

        let branch = repo
            .create_branch(&request.name, &request.description)
            .await?;
        tracing::info!(branch_id = branch.id, by = %identity.username, "Branch created");
        Ok(branch)
    }

    /// Lists the branches visible to the caller.
    pub async fn list_branches(&self, identity: &Identity) -> ServiceResult<Vec<Branch>> {
        let repo = BranchRepository::new(self.pool);

        match policy::listing_scope(identity, "branches")? {
            ListScope::All => Ok(repo.list_branches().await?),
            ListScope::Branch(id) => Ok(repo.get_branch_by_id(id).await?.into_iter().collect()),
        }
    }

    pub async fn get_branch(&self, identity: &Identity, id: BranchId) -> ServiceResult<Branch> {
        let branch = self.get_branch_required(id).await?;
        policy::authorize_branch(identity, Action::Read, Some(id))?;
        Ok(branch)
    }

    /// Renames and/or re-describes a branch. Absent fields are left as is.
    pub async fn update_branch(
        &self,
        identity: &Identity,
        id: BranchId,
        request: UpdateBranchRequest,
    ) -> ServiceResult<Branch> {
        policy::authorize_branch(identity, Action::Update, Some(id))?;
        let request = request.trimmed();
        request.validate().map_err(validation_failure)?;

        let branch = self.get_branch_required(id).await?;
        let repo = BranchRepository::new(self.pool);

        let name = match request.name {
            Some(name) if name != branch.name => {
                if repo.name_exists(&name, Some(id)).await? {
                    return Err(ServiceError::already_exists("Branch", &name));
                }
                name
            }
            _ => branch.name,
        };
        let description = request.description.unwrap_or(branch.description);

        repo.update_branch(id, &name, &description)
            .await?
            .ok_or_else(|| ServiceError::not_found("Branch", id))
    }

    /// Deletes an empty branch.
    ///
    /// # Errors
    /// `InvalidOperation` while any student or professor still belongs to it.
    pub async fn delete_branch(&self, identity: &Identity, id: BranchId) -> ServiceResult<()> {
        policy::authorize_branch(identity, Action::Delete, Some(id))?;

        match BranchRepository::new(self.pool)
            .delete_branch_if_empty(id)
            .await?
        {
            BranchDeletion::Deleted => {
                tracing::info!(branch_id = id, by = %identity.username, "Branch deleted");
                Ok(())
            }
            BranchDeletion::NotFound => Err(ServiceError::not_found("Branch", id)),
            BranchDeletion::Occupied => Err(ServiceError::invalid_operation(
                "Cannot delete branch with associated students or professors",
            )),
        }
    }

    /// Retrieves a branch by ID with existence verification.
    pub async fn get_branch_required(&self, id: BranchId) -> ServiceResult<Branch> {
        BranchRepository::new(self.pool)
            .get_branch_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Branch", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::database::models::{CreateUser, Gender, NewStudent, Role};
    use crate::repositories::student_repository::StudentRepository;
    use crate::repositories::user_repository::UserRepository;

    fn admin() -> Identity {
        Identity::admin(1, "admin")
    }

    fn request(name: &str) -> BranchRequest {
        BranchRequest {
            name: name.to_string(),
            description: format!("{name} department of the faculty"),
        }
    }

    #[tokio::test]
    async fn test_admin_creates_and_lists_branches() {
        let db = Database::in_memory().await.unwrap();
        let service = BranchService::new(db.pool());

        let cs = service.create_branch(&admin(), request("  CS  ")).await.unwrap();
        assert_eq!(cs.name, "CS");
        service.create_branch(&admin(), request("EE")).await.unwrap();

        let all = service.list_branches(&admin()).await.unwrap();
        assert_eq!(all.len(), 2);

        let prof = Identity::professor(2, "profA", cs.id);
        let visible = service.list_branches(&prof).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, cs.id);
    }

    #[tokio::test]
    async fn test_length_limits_apply_to_trimmed_values() {
        let db = Database::in_memory().await.unwrap();
        let service = BranchService::new(db.pool());

        let err = service
            .create_branch(
                &admin(),
                BranchRequest {
                    name: "   X   ".to_string(),
                    description: "Electrical engineering".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let err = service
            .create_branch(
                &admin(),
                BranchRequest {
                    name: "EE".to_string(),
                    description: "   short    ".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let cs = service.create_branch(&admin(), request("CS")).await.unwrap();
        let err = service
            .update_branch(
                &admin(),
                cs.id,
                UpdateBranchRequest {
                    name: Some("  C  ".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert_eq!(service.list_branches(&admin()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let db = Database::in_memory().await.unwrap();
        let service = BranchService::new(db.pool());

        service.create_branch(&admin(), request("CS")).await.unwrap();
        let err = service.create_branch(&admin(), request("CS")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_professor_cannot_mutate_branches() {
        let db = Database::in_memory().await.unwrap();
        let service = BranchService::new(db.pool());
        let cs = service.create_branch(&admin(), request("CS")).await.unwrap();
        let prof = Identity::professor(2, "profA", cs.id);

        let err = service.create_branch(&prof, request("ME")).await.unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied { .. }));

        let err = service.delete_branch(&prof, cs.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied { .. }));

        assert_eq!(service.get_branch(&prof, cs.id).await.unwrap().id, cs.id);
    }

    #[tokio::test]
    async fn test_professor_reads_only_own_branch() {
        let db = Database::in_memory().await.unwrap();
        let service = BranchService::new(db.pool());
        let cs = service.create_branch(&admin(), request("CS")).await.unwrap();
        let ee = service.create_branch(&admin(), request("EE")).await.unwrap();
        let prof = Identity::professor(2, "profA", cs.id);

        let err = service.get_branch(&prof, ee.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_update_renames_and_keeps_missing_fields() {
        let db = Database::in_memory().await.unwrap();
        let service = BranchService::new(db.pool());
        let cs = service.create_branch(&admin(), request("CS")).await.unwrap();
        service.create_branch(&admin(), request("EE")).await.unwrap();

        let updated = service
            .update_branch(
                &admin(),
                cs.id,
                UpdateBranchRequest {
                    name: Some("Computing".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Computing");
        assert_eq!(updated.description, cs.description);

        let err = service
            .update_branch(
                &admin(),
                cs.id,
                UpdateBranchRequest {
                    name: Some("EE".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_delete_guard_blocks_occupied_branch() {
        let db = Database::in_memory().await.unwrap();
        let service = BranchService::new(db.pool());
        let cs = service.create_branch(&admin(), request("CS")).await.unwrap();

        let student = StudentRepository::new(db.pool())
            .create_student(NewStudent {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                age: 20,
                gender: Gender::Female,
                branch_id: cs.id,
            })
            .await
            .unwrap();
        let professor = UserRepository::new(db.pool())
            .create_user(CreateUser {
                username: "profA".to_string(),
                password_hash: "not-a-real-hash".to_string(),
                role: Role::Professor,
                branch_id: Some(cs.id),
            })
            .await
            .unwrap();

        let err = service.delete_branch(&admin(), cs.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation { .. }));

        StudentRepository::new(db.pool())
            .delete_student(student.id)
            .await
            .unwrap();
        let err = service.delete_branch(&admin(), cs.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation { .. }));

        UserRepository::new(db.pool())
            .delete_user(professor.id)
            .await
            .unwrap();
        service.delete_branch(&admin(), cs.id).await.unwrap();

        let err = service.delete_branch(&admin(), cs.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unassigned_professor_is_refused() {
        let db = Database::in_memory().await.unwrap();
        let service = BranchService::new(db.pool());
        let cs = service.create_branch(&admin(), request("CS")).await.unwrap();
        let unassigned = Identity::unassigned_professor(3, "profB");

        for err in [
            service.list_branches(&unassigned).await.unwrap_err(),
            service.get_branch(&unassigned, cs.id).await.unwrap_err(),
        ] {
            match err {
                ServiceError::PermissionDenied { message } => {
                    assert!(message.contains("must be assigned to a branch"))
                }
                other => panic!("expected permission denied, got {other:?}"),
            }
        }
    }
}
