//! Enrollment ledger service: enrollment changes, rosters and submissions.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{CourseRepository, EnrollmentLedger, EnrollmentRepository, UserRepository};
use super::store_errors::{map_course_error, map_enrollment_error, map_user_error};
use super::{
    AssignmentId, CallerContext, Course, CourseId, Error, NewSubmission, Operation, Resource,
    Role, Submission, User, UserId, authorize,
};

/// Service implementing [`EnrollmentLedger`].
pub struct EnrollmentService<U, C, E> {
    users: Arc<U>,
    courses: Arc<C>,
    enrollments: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<U, C, E> EnrollmentService<U, C, E>
where
    U: UserRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
{
    pub fn new(
        users: Arc<U>,
        courses: Arc<C>,
        enrollments: Arc<E>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            courses,
            enrollments,
            clock,
        }
    }

    async fn require_student(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .filter(|user| user.role() == Role::Student)
            .ok_or_else(|| Error::not_found(format!("student {id} not found")))
    }

    async fn require_course(&self, id: CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(format!("course {id} not found")))
    }

    async fn is_enrolled(&self, student: UserId, course: CourseId) -> Result<bool, Error> {
        self.enrollments
            .is_enrolled(student, course)
            .await
            .map_err(map_enrollment_error)
    }
}

fn pair(student: UserId, course: CourseId) -> String {
    format!("{student}:{course}")
}

#[async_trait]
impl<U, C, E> EnrollmentLedger for EnrollmentService<U, C, E>
where
    U: UserRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn enroll(
        &self,
        caller: &CallerContext,
        student: UserId,
        course: CourseId,
    ) -> Result<(), Error> {
        authorize(caller, Operation::Create, Resource::Enrollment { student })?;
        self.require_student(student).await?;
        self.require_course(course).await?;
        if self.is_enrolled(student, course).await? {
            warn!(%student, %course, "student already enrolled");
            return Err(Error::duplicate("enrollment", pair(student, course)));
        }

        self.enrollments
            .enroll(student, course, self.clock.utc())
            .await
            .map_err(map_enrollment_error)?;
        info!(%student, %course, "enrolled student");
        Ok(())
    }

    async fn withdraw(
        &self,
        caller: &CallerContext,
        student: UserId,
        course: CourseId,
    ) -> Result<(), Error> {
        authorize(caller, Operation::Delete, Resource::Enrollment { student })?;
        self.require_student(student).await?;
        self.require_course(course).await?;

        let removed = self
            .enrollments
            .withdraw(student, course)
            .await
            .map_err(map_enrollment_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "student {student} is not enrolled in course {course}"
            )));
        }
        info!(%student, %course, "withdrew student");
        Ok(())
    }

    async fn roster_for_course(
        &self,
        caller: &CallerContext,
        course: CourseId,
    ) -> Result<Vec<User>, Error> {
        authorize(caller, Operation::Read, Resource::Roster)?;
        self.require_course(course).await?;
        self.enrollments
            .roster(course)
            .await
            .map_err(map_enrollment_error)
    }

    async fn submit_assignment(
        &self,
        caller: &CallerContext,
        assignment: AssignmentId,
        student: UserId,
        file_reference: Option<String>,
    ) -> Result<Submission, Error> {
        authorize(caller, Operation::Create, Resource::Submission { student })?;
        let target = self
            .courses
            .find_assignment(assignment)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(format!("assignment {} not found", assignment.get())))?;
        self.require_student(student).await?;
        if !self.is_enrolled(student, target.course_id).await? {
            warn!(%student, course = %target.course_id, "submission from unenrolled student");
            return Err(Error::forbidden(
                "only students enrolled in the course may submit",
            ));
        }

        let submission = self
            .enrollments
            .record_submission(NewSubmission {
                assignment_id: assignment,
                student_id: student,
                file_reference,
                submitted_at: self.clock.utc(),
            })
            .await
            .map_err(map_enrollment_error)?;
        info!(%student, assignment = assignment.get(), "recorded submission");
        Ok(submission)
    }
}

#[cfg(test)]
#[path = "enrollment_service_tests.rs"]
mod tests;
