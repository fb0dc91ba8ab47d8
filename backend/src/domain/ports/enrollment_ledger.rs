//! Driving port for enrollment changes and submissions.

use async_trait::async_trait;

use crate::domain::{AssignmentId, CallerContext, CourseId, Error, Submission, User, UserId};

#[async_trait]
pub trait EnrollmentLedger: Send + Sync {
    async fn enroll(
        &self,
        caller: &CallerContext,
        student: UserId,
        course: CourseId,
    ) -> Result<(), Error>;

    async fn withdraw(
        &self,
        caller: &CallerContext,
        student: UserId,
        course: CourseId,
    ) -> Result<(), Error>;

    async fn roster_for_course(
        &self,
        caller: &CallerContext,
        course: CourseId,
    ) -> Result<Vec<User>, Error>;

    /// Record the caller's single submission for an assignment of a course
    /// they are enrolled in.
    async fn submit_assignment(
        &self,
        caller: &CallerContext,
        assignment: AssignmentId,
        student: UserId,
        file_reference: Option<String>,
    ) -> Result<Submission, Error>;
}
