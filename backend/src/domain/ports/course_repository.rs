//! Driven port for courses and the children they own.
//!
//! Schedules and assignments are only ever reached through their course, so
//! one port covers all three tables. Multi-row writes (`create`, `update`,
//! `delete`) run inside a single store transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, Course, CourseChanges, CourseCode,
    CourseDeletionPlan, CourseId, NewCourse, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repository adapters.
    store CourseRepositoryError => "course repository"
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError>;

    async fn find_by_code(
        &self,
        code: &CourseCode,
    ) -> Result<Option<Course>, CourseRepositoryError>;

    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError>;

    async fn list_by_teacher(&self, teacher: UserId) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Insert the course row, then its schedules referencing the new id.
    async fn create(&self, course: NewCourse) -> Result<Course, CourseRepositoryError>;

    /// Apply changes; a supplied schedule list replaces the stored set.
    ///
    /// Returns `Ok(None)` when the course no longer exists.
    async fn update(&self, changes: CourseChanges)
    -> Result<Option<Course>, CourseRepositoryError>;

    /// Execute every step of `plan` in order inside one transaction.
    async fn delete(&self, plan: &CourseDeletionPlan) -> Result<(), CourseRepositoryError>;

    async fn create_assignment(
        &self,
        course: CourseId,
        draft: AssignmentDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Assignment, CourseRepositoryError>;

    async fn list_assignments(
        &self,
        course: CourseId,
    ) -> Result<Vec<Assignment>, CourseRepositoryError>;

    async fn find_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, CourseRepositoryError>;
}
