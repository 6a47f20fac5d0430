//! Database repository for student records.
//!
//! Every read joins the owning branch so responses carry the branch name.

use crate::database::models::{BranchId, Gender, NewStudent, Student, StudentId};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const STUDENT_SELECT: &str = r#"
    SELECT s.id, s.name, s.email, s.age, s.gender, s.branch_id,
           b.name AS branch_name, s.created_at, s.updated_at
    FROM students s
    JOIN branches b ON b.id = s.branch_id
"#;

/// Column values written by a student update.
#[derive(Debug, Clone)]
pub struct StudentChanges {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub gender: Gender,
    pub branch_id: BranchId,
}

/// Repository for student database operations.
pub struct StudentRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> StudentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a student and returns it with the branch name resolved.
    pub async fn create_student(&self, student: NewStudent) -> Result<Student> {
        let id: StudentId = sqlx::query_scalar(
            r#"
            INSERT INTO students (name, email, age, gender, branch_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(student.age)
        .bind(student.gender)
        .bind(student.branch_id)
        .fetch_one(self.pool)
        .await?;

        self.get_student_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("student {id} vanished after insert"))
    }

    pub async fn get_student_by_id(&self, id: StudentId) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE s.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(student)
    }

    pub async fn get_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        let student =
            sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE s.email = ?"))
                .bind(email)
                .fetch_optional(self.pool)
                .await?;

        Ok(student)
    }

    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} ORDER BY s.id"))
            .fetch_all(self.pool)
            .await?;

        Ok(students)
    }

    pub async fn list_students_by_branch(&self, branch_id: BranchId) -> Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "{STUDENT_SELECT} WHERE s.branch_id = ? ORDER BY s.id"
        ))
        .bind(branch_id)
        .fetch_all(self.pool)
        .await?;

        Ok(students)
    }

    /// Checks if an email is already used, optionally ignoring one student.
    pub async fn email_exists(&self, email: &str, exclude_id: Option<StudentId>) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE email = ? AND id != ?")
                .bind(email)
                .bind(exclude_id.unwrap_or(-1))
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    pub async fn update_student(
        &self,
        id: StudentId,
        changes: StudentChanges,
    ) -> Result<Option<Student>> {
        let updated = sqlx::query(
            r#"
            UPDATE students
            SET name = ?, email = ?, age = ?, gender = ?, branch_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(changes.age)
        .bind(changes.gender)
        .bind(changes.branch_id)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }

        self.get_student_by_id(id).await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete_student(&self, id: StudentId) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}
