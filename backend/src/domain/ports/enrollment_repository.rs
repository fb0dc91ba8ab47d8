//! Driven port for the student/course join table and submissions.
//!
//! The join table is the single source of truth for enrollment; both
//! `courses_for_student` and `roster` are projections of it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Course, CourseId, NewSubmission, Submission, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by enrollment repository adapters.
    store EnrollmentRepositoryError => "enrollment repository"
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn is_enrolled(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<bool, EnrollmentRepositoryError>;

    /// Record the pair; a second insert of the same pair is `Duplicate`.
    async fn enroll(
        &self,
        student: UserId,
        course: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<(), EnrollmentRepositoryError>;

    /// Remove the pair. Returns `Ok(false)` when it was not recorded.
    async fn withdraw(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<bool, EnrollmentRepositoryError>;

    async fn courses_for_student(
        &self,
        student: UserId,
    ) -> Result<Vec<Course>, EnrollmentRepositoryError>;

    async fn roster(&self, course: CourseId) -> Result<Vec<User>, EnrollmentRepositoryError>;

    /// Store a submission; a second one for the same pair is `Duplicate`.
    async fn record_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, EnrollmentRepositoryError>;
}
