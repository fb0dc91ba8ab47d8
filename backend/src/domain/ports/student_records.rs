//! Driving port for student records and registration.

use async_trait::async_trait;

use crate::domain::{
    CallerContext, Course, Email, Error, Password, PersonName, StudentNumber, StudentProfile,
    User, UserId,
};

/// Validated student registration form.
#[derive(Debug, Clone)]
pub struct StudentRegistration {
    pub name: PersonName,
    pub email: Email,
    pub password: Password,
    pub profile: StudentProfile,
}

/// Replacement values for a student's editable fields.
#[derive(Debug, Clone)]
pub struct StudentUpdate {
    pub name: PersonName,
    pub profile: StudentProfile,
}

/// A student together with the courses they are enrolled in.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub user: User,
    pub enrolled_courses: Vec<Course>,
}

#[async_trait]
pub trait StudentRecords: Send + Sync {
    async fn get_student(&self, caller: &CallerContext, id: UserId)
    -> Result<StudentRecord, Error>;

    async fn get_student_by_number(
        &self,
        caller: &CallerContext,
        number: &StudentNumber,
    ) -> Result<StudentRecord, Error>;

    async fn list_students(&self, caller: &CallerContext) -> Result<Vec<User>, Error>;

    async fn update_student(
        &self,
        caller: &CallerContext,
        id: UserId,
        update: StudentUpdate,
    ) -> Result<StudentRecord, Error>;

    async fn student_courses(
        &self,
        caller: &CallerContext,
        id: UserId,
    ) -> Result<Vec<Course>, Error>;

    /// Register a student on behalf of an ADMIN or TEACHER.
    async fn register_student(
        &self,
        caller: &CallerContext,
        registration: StudentRegistration,
    ) -> Result<User, Error>;

    /// Public self-registration; no caller is required.
    async fn self_register_student(&self, registration: StudentRegistration)
    -> Result<User, Error>;
}
