//! Driving port for the course catalog.
//!
//! Course reads are open to any authenticated caller; every mutation passes
//! through the authorization gate first.

use async_trait::async_trait;

use crate::domain::{
    Assignment, AssignmentDraft, CallerContext, Course, CourseCode, CourseDetails, CourseId,
    Error, ScheduleDraft, TeacherNumber, UserId,
};

/// Course create/update form. The teacher is named by public number.
#[derive(Debug, Clone)]
pub struct CourseForm {
    pub details: CourseDetails,
    pub teacher: TeacherNumber,
    /// `None` keeps the stored schedules on update and means "none" on create.
    pub schedules: Option<Vec<ScheduleDraft>>,
}

#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn create_course(&self, caller: &CallerContext, form: CourseForm)
    -> Result<Course, Error>;

    async fn update_course(
        &self,
        caller: &CallerContext,
        id: CourseId,
        form: CourseForm,
    ) -> Result<Course, Error>;

    /// Remove the course and everything it owns; students and the teacher stay.
    async fn delete_course(&self, caller: &CallerContext, id: CourseId) -> Result<(), Error>;

    async fn get_course(&self, caller: &CallerContext, id: CourseId) -> Result<Course, Error>;

    async fn get_course_by_code(
        &self,
        caller: &CallerContext,
        code: &CourseCode,
    ) -> Result<Course, Error>;

    /// Courses taught by the teacher with this user id.
    async fn courses_for_teacher(
        &self,
        caller: &CallerContext,
        teacher: UserId,
    ) -> Result<Vec<Course>, Error>;

    async fn list_courses(&self, caller: &CallerContext) -> Result<Vec<Course>, Error>;

    async fn create_assignment(
        &self,
        caller: &CallerContext,
        course: CourseId,
        draft: AssignmentDraft,
    ) -> Result<Assignment, Error>;

    async fn list_assignments(
        &self,
        caller: &CallerContext,
        course: CourseId,
    ) -> Result<Vec<Assignment>, Error>;
}
