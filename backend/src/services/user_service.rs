//! User business logic service.
//!
//! Handles account management. Every operation except `me` is reserved to
//! admins; professors must be attached to an existing branch and admins must
//! not be.

use crate::auth::models::Identity;
use crate::auth::policy::{self, Action};
use crate::database::models::{
    BranchId, CreateUser, RegisterRequest, Role, UpdateUserRequest, User, UserId,
};
use crate::errors::{ServiceError, ServiceResult, validation_failure};
use crate::repositories::branch_repository::BranchRepository;
use crate::repositories::user_repository::{UserChanges, UserRepository};
use bcrypt::{hash, verify};
use sqlx::SqlitePool;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    /// bcrypt work factor for new hashes
    bcrypt_cost: u32,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `bcrypt_cost` - Work factor used when hashing passwords
    pub fn new(pool: &'a SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    /// Registers a new account.
    ///
    /// # Arguments
    /// * `identity` - Caller; must be an admin
    /// * `request` - Username, plain password, role and optional branch
    ///
    /// # Returns
    /// The stored User. The hash is never serialized.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Non-admin callers
    /// - Validation failures, including role/branch mismatches
    /// - Duplicate usernames
    /// - Unknown branch
    pub async fn register(
        &self,
        identity: &Identity,
        request: RegisterRequest,
    ) -> ServiceResult<User> {
        policy::authorize_user_admin(identity, Action::Create)?;
        let request = request.trimmed();
        request.validate().map_err(validation_failure)?;

        let username = request.username;
        let repo = UserRepository::new(self.pool);
        if repo.username_exists(&username, None).await? {
            return Err(ServiceError::already_exists("User", &username));
        }

        self.check_role_branch(request.role, request.branch_id)
            .await?;

        let password_hash = self.hash_password(&request.password)?;
        let user = repo
            .create_user(CreateUser {
                username,
                password_hash,
                role: request.role,
                branch_id: request.branch_id,
            })
            .await?;

        tracing::info!(
            user_id = user.id,
            role = user.role.as_str(),
            by = %identity.username,
            "User registered"
        );
        Ok(user)
    }

    pub async fn list_users(&self, identity: &Identity) -> ServiceResult<Vec<User>> {
        policy::authorize_user_admin(identity, Action::Read)?;
        Ok(UserRepository::new(self.pool).list_users().await?)
    }

    pub async fn get_user(&self, identity: &Identity, id: UserId) -> ServiceResult<User> {
        policy::authorize_user_admin(identity, Action::Read)?;
        self.get_user_required(id).await
    }

    /// Updates username, password, role and branch.
    ///
    /// A missing password keeps the current hash. Role and branch are
    /// checked together, as on registration.
    pub async fn update_user(
        &self,
        identity: &Identity,
        id: UserId,
        request: UpdateUserRequest,
    ) -> ServiceResult<User> {
        policy::authorize_user_admin(identity, Action::Update)?;
        let request = request.trimmed();
        request.validate().map_err(validation_failure)?;

        let user = self.get_user_required(id).await?;
        let repo = UserRepository::new(self.pool);

        let username = match request.username {
            Some(username) if username != user.username => {
                if repo.username_exists(&username, Some(id)).await? {
                    return Err(ServiceError::already_exists("User", &username));
                }
                username
            }
            _ => user.username,
        };

        self.check_role_branch(request.role, request.branch_id)
            .await?;

        let password_hash = request
            .password
            .as_deref()
            .map(|password| self.hash_password(password))
            .transpose()?;

        let updated = repo
            .update_user(
                id,
                UserChanges {
                    username,
                    password_hash,
                    role: request.role,
                    branch_id: request.branch_id,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        tracing::info!(user_id = id, by = %identity.username, "User updated");
        Ok(updated)
    }

    /// Deletes an account. Admins cannot delete themselves.
    pub async fn delete_user(&self, identity: &Identity, id: UserId) -> ServiceResult<()> {
        policy::authorize_user_admin(identity, Action::Delete)?;

        if identity.user_id == id {
            return Err(ServiceError::invalid_operation(
                "You cannot delete your own account",
            ));
        }

        if !UserRepository::new(self.pool).delete_user(id).await? {
            return Err(ServiceError::not_found("User", id));
        }

        tracing::info!(user_id = id, by = %identity.username, "User deleted");
        Ok(())
    }

    /// Profile of the calling identity.
    pub async fn me(&self, identity: &Identity) -> ServiceResult<User> {
        self.get_user_required(identity.user_id).await
    }

    /// Seeds an admin account when no user with `username` exists.
    ///
    /// # Returns
    /// `true` if an account was created
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<bool> {
        let repo = UserRepository::new(self.pool);
        if repo.get_user_by_username(username).await?.is_some() {
            return Ok(false);
        }

        let password_hash = self.hash_password(password)?;
        repo.create_user(CreateUser {
            username: username.to_string(),
            password_hash,
            role: Role::Admin,
            branch_id: None,
        })
        .await?;

        tracing::info!(username, "Bootstrap admin account created");
        Ok(true)
    }

    /// Retrieves a user by ID with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if user doesn't exist
    pub async fn get_user_required(&self, id: UserId) -> ServiceResult<User> {
        UserRepository::new(self.pool)
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Function to hash a password before storing in database
    ///
    /// # Errors
    /// Returns `ServiceError` if hashing fails
    fn hash_password(&self, password: &str) -> ServiceResult<String> {
        hash(password, self.bcrypt_cost)
            .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {e}")))
    }

    async fn check_role_branch(&self, role: Role, branch_id: Option<BranchId>) -> ServiceResult<()> {
        match (role, branch_id) {
            (Role::Admin, Some(_)) => Err(ServiceError::validation(
                "Admin users cannot be assigned to a branch",
            )),
            (Role::Professor, None) => Err(ServiceError::validation(
                "Professor must be assigned to a branch",
            )),
            (Role::Admin, None) => Ok(()),
            (Role::Professor, Some(branch_id)) => {
                if BranchRepository::new(self.pool)
                    .branch_exists(branch_id)
                    .await?
                {
                    Ok(())
                } else {
                    Err(ServiceError::not_found("Branch", branch_id))
                }
            }
        }
    }
}

/// Checks a plain password against a stored bcrypt hash.
///
/// A malformed hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    const COST: u32 = 4;

    fn admin() -> Identity {
        Identity::admin(1, "admin")
    }

    fn register(username: &str, role: Role, branch_id: Option<BranchId>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "secret123".to_string(),
            role,
            branch_id,
        }
    }

    async fn with_branch() -> (Database, BranchId) {
        let db = Database::in_memory().await.unwrap();
        let cs = BranchRepository::new(db.pool())
            .create_branch("CS", "Computer science department")
            .await
            .unwrap();
        (db, cs.id)
    }

    #[tokio::test]
    async fn test_register_professor_hashes_password() {
        let (db, cs) = with_branch().await;
        let service = UserService::new(db.pool(), COST);

        let user = service
            .register(&admin(), register("profA", Role::Professor, Some(cs)))
            .await
            .unwrap();

        assert_eq!(user.role, Role::Professor);
        assert_eq!(user.branch_id, Some(cs));
        assert_eq!(user.branch_name.as_deref(), Some("CS"));
        assert_ne!(user.password_hash, "secret123");
        assert!(verify_password("secret123", &user.password_hash));
        assert!(!verify_password("wrong", &user.password_hash));

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_register_enforces_role_branch_rules() {
        let (db, cs) = with_branch().await;
        let service = UserService::new(db.pool(), COST);

        let err = service
            .register(&admin(), register("root2", Role::Admin, Some(cs)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let err = service
            .register(&admin(), register("profB", Role::Professor, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let err = service
            .register(&admin(), register("profC", Role::Professor, Some(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_non_admins() {
        let (db, cs) = with_branch().await;
        let service = UserService::new(db.pool(), COST);

        service
            .register(&admin(), register("profA", Role::Professor, Some(cs)))
            .await
            .unwrap();
        let err = service
            .register(&admin(), register("profA", Role::Professor, Some(cs)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { .. }));

        let prof = Identity::professor(2, "profA", cs);
        let err = service
            .register(&prof, register("profD", Role::Professor, Some(cs)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied { .. }));
        assert!(matches!(
            service.list_users(&prof).await.unwrap_err(),
            ServiceError::PermissionDenied { .. }
        ));
    }

    #[tokio::test]
    async fn test_username_length_is_checked_after_trimming() {
        let (db, cs) = with_branch().await;
        let service = UserService::new(db.pool(), COST);

        let err = service
            .register(&admin(), register("  ab  ", Role::Professor, Some(cs)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let user = service
            .register(&admin(), register("  profA  ", Role::Professor, Some(cs)))
            .await
            .unwrap();
        assert_eq!(user.username, "profA");

        let err = service
            .update_user(
                &admin(),
                user.id,
                UpdateUserRequest {
                    username: Some(" xy ".to_string()),
                    password: None,
                    role: Role::Professor,
                    branch_id: Some(cs),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert_eq!(service.get_user(&admin(), user.id).await.unwrap().username, "profA");
    }

    #[tokio::test]
    async fn test_update_keeps_hash_without_password() {
        let (db, cs) = with_branch().await;
        let service = UserService::new(db.pool(), COST);
        let user = service
            .register(&admin(), register("profA", Role::Professor, Some(cs)))
            .await
            .unwrap();

        let updated = service
            .update_user(
                &admin(),
                user.id,
                UpdateUserRequest {
                    username: Some("profAlpha".to_string()),
                    password: None,
                    role: Role::Professor,
                    branch_id: Some(cs),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "profAlpha");
        assert_eq!(updated.password_hash, user.password_hash);

        let updated = service
            .update_user(
                &admin(),
                user.id,
                UpdateUserRequest {
                    username: None,
                    password: Some("another-secret".to_string()),
                    role: Role::Admin,
                    branch_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.branch_id, None);
        assert!(verify_password("another-secret", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_update_rejects_professor_without_branch() {
        let (db, cs) = with_branch().await;
        let service = UserService::new(db.pool(), COST);
        let user = service
            .register(&admin(), register("profA", Role::Professor, Some(cs)))
            .await
            .unwrap();

        let err = service
            .update_user(
                &admin(),
                user.id,
                UpdateUserRequest {
                    username: None,
                    password: None,
                    role: Role::Professor,
                    branch_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let db = Database::in_memory().await.unwrap();
        let service = UserService::new(db.pool(), COST);
        assert!(service.ensure_bootstrap_admin("admin", "admin123").await.unwrap());
        let root = UserRepository::new(db.pool())
            .get_user_by_username("admin")
            .await
            .unwrap()
            .unwrap();
        let identity = Identity::from(&root);

        let err = service.delete_user(&identity, root.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation { .. }));

        let err = service.delete_user(&identity, 999).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        assert_eq!(service.me(&identity).await.unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let service = UserService::new(db.pool(), COST);

        assert!(service.ensure_bootstrap_admin("admin", "admin123").await.unwrap());
        assert!(!service.ensure_bootstrap_admin("admin", "other").await.unwrap());

        let users = service.list_users(&admin()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
        assert!(verify_password("admin123", &users[0].password_hash));
    }

    #[test]
    fn test_corrupt_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
