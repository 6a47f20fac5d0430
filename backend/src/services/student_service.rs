//! Student business logic service.
//!
//! Admins manage every student. Professors manage students of their own
//! branch only, and cannot move a student to another branch.

use crate::auth::models::Identity;
use crate::auth::policy::{self, Action, ListScope};
use crate::database::models::{
    BranchId, NewStudent, Student, StudentId, StudentRequest, UpdateStudentRequest,
};
use crate::errors::{ServiceError, ServiceResult, validation_failure};
use crate::repositories::branch_repository::BranchRepository;
use crate::repositories::student_repository::{StudentChanges, StudentRepository};
use sqlx::SqlitePool;
use validator::Validate;

/// Service layer for student operations.
pub struct StudentService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> StudentService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers a student in an existing branch.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Validation failures
    /// - Duplicate email (`AlreadyExists`)
    /// - Unknown branch (`NotFound`)
    /// - Professors targeting another branch, or with no branch (`PermissionDenied`)
    pub async fn create_student(
        &self,
        identity: &Identity,
        request: StudentRequest,
    ) -> ServiceResult<Student> {
        let request = request.trimmed();
        request.validate().map_err(validation_failure)?;

        let repo = StudentRepository::new(self.pool);
        if repo.email_exists(&request.email, None).await? {
            return Err(ServiceError::already_exists("Student", &request.email));
        }

        self.ensure_branch_exists(request.branch_id).await?;
        policy::authorize_student(identity, Action::Create, request.branch_id)?;

        let student = repo
            .create_student(NewStudent {
                name: request.name,
                email: request.email,
                age: request.age,
                gender: request.gender,
                branch_id: request.branch_id,
            })
            .await?;

        tracing::info!(
            student_id = student.id,
            branch_id = student.branch_id,
            by = %identity.username,
            "Student created"
        );
        Ok(student)
    }

    /// Lists students visible to the caller: all for admins, own branch for
    /// professors.
    pub async fn list_students(&self, identity: &Identity) -> ServiceResult<Vec<Student>> {
        let repo = StudentRepository::new(self.pool);

        match policy::listing_scope(identity, "students")? {
            ListScope::All => Ok(repo.list_students().await?),
            ListScope::Branch(branch_id) => Ok(repo.list_students_by_branch(branch_id).await?),
        }
    }

    pub async fn list_students_by_branch(
        &self,
        identity: &Identity,
        branch_id: BranchId,
    ) -> ServiceResult<Vec<Student>> {
        self.ensure_branch_exists(branch_id).await?;
        policy::authorize_student(identity, Action::Read, branch_id)?;

        Ok(StudentRepository::new(self.pool)
            .list_students_by_branch(branch_id)
            .await?)
    }

    pub async fn get_student(&self, identity: &Identity, id: StudentId) -> ServiceResult<Student> {
        let student = self.get_student_required(id).await?;
        policy::authorize_student(identity, Action::Read, student.branch_id)?;
        Ok(student)
    }

    /// Applies a partial update.
    ///
    /// A professor's requested branch change is dropped; every other field
    /// still applies.
    pub async fn update_student(
        &self,
        identity: &Identity,
        id: StudentId,
        request: UpdateStudentRequest,
    ) -> ServiceResult<Student> {
        let request = request.trimmed();
        request.validate().map_err(validation_failure)?;

        let student = self.get_student_required(id).await?;
        policy::authorize_student(identity, Action::Update, student.branch_id)?;

        let repo = StudentRepository::new(self.pool);

        let email = match request.email {
            Some(email) if email != student.email => {
                if repo.email_exists(&email, Some(id)).await? {
                    return Err(ServiceError::already_exists("Student", &email));
                }
                email
            }
            _ => student.email,
        };

        let branch_id = match policy::student_update_branch(identity, request.branch_id) {
            Some(branch_id) => {
                self.ensure_branch_exists(branch_id).await?;
                branch_id
            }
            None => {
                if request.branch_id.is_some_and(|b| b != student.branch_id) {
                    tracing::debug!(
                        student_id = id,
                        by = %identity.username,
                        "Ignoring branch change requested by non-admin"
                    );
                }
                student.branch_id
            }
        };

        let changes = StudentChanges {
            name: request.name.unwrap_or(student.name),
            email,
            age: request.age.unwrap_or(student.age),
            gender: request.gender.unwrap_or(student.gender),
            branch_id,
        };

        repo.update_student(id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student", id))
    }

    pub async fn delete_student(&self, identity: &Identity, id: StudentId) -> ServiceResult<()> {
        let student = self.get_student_required(id).await?;
        policy::authorize_student(identity, Action::Delete, student.branch_id)?;

        if !StudentRepository::new(self.pool).delete_student(id).await? {
            return Err(ServiceError::not_found("Student", id));
        }

        tracing::info!(student_id = id, by = %identity.username, "Student deleted");
        Ok(())
    }

    /// Unauthenticated lookup by email.
    pub async fn get_student_by_email_public(&self, email: &str) -> ServiceResult<Student> {
        StudentRepository::new(self.pool)
            .get_student_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student", email))
    }

    async fn get_student_required(&self, id: StudentId) -> ServiceResult<Student> {
        StudentRepository::new(self.pool)
            .get_student_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student", id))
    }

    async fn ensure_branch_exists(&self, branch_id: BranchId) -> ServiceResult<()> {
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
