//! Driving port for teacher records and registration.

use async_trait::async_trait;

use crate::domain::{
    CallerContext, Course, Email, Error, Password, PersonName, TeacherNumber, TeacherProfile,
    User, UserId,
};

/// Validated teacher registration form.
#[derive(Debug, Clone)]
pub struct TeacherRegistration {
    pub name: PersonName,
    pub email: Email,
    pub password: Password,
    pub profile: TeacherProfile,
}

#[derive(Debug, Clone)]
pub struct TeacherUpdate {
    pub name: PersonName,
    pub profile: TeacherProfile,
}

/// A teacher together with the courses they are assigned to.
#[derive(Debug, Clone)]
pub struct TeacherRecord {
    pub user: User,
    pub assigned_courses: Vec<Course>,
}

#[async_trait]
pub trait TeacherRecords: Send + Sync {
    async fn get_teacher(&self, caller: &CallerContext, id: UserId)
    -> Result<TeacherRecord, Error>;

    async fn get_teacher_by_number(
        &self,
        caller: &CallerContext,
        number: &TeacherNumber,
    ) -> Result<TeacherRecord, Error>;

    async fn list_teachers(&self, caller: &CallerContext) -> Result<Vec<User>, Error>;

    async fn update_teacher(
        &self,
        caller: &CallerContext,
        id: UserId,
        update: TeacherUpdate,
    ) -> Result<TeacherRecord, Error>;

    async fn register_teacher(
        &self,
        caller: &CallerContext,
        registration: TeacherRegistration,
    ) -> Result<User, Error>;
}
