//! PostgreSQL-backed `EnrollmentRepository`.
//!
//! `student_courses` is the single source for both directions of the
//! relation: a student's courses and a course's roster read the same rows.
//! Both projections load their children inside one read-only snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::domain::ports::{EnrollmentRepository, EnrollmentRepositoryError};
use crate::domain::{Course, CourseId, NewSubmission, Submission, User, UserId};

use super::diesel_error_mapping::port_error_mapping;
use super::models::{CourseRow, NewEnrollmentRow, NewSubmissionRow, SubmissionRow, UserRow};
use super::pool::DbPool;
use super::row_mapping::{
    course_from_rows, fetch_course_children, fetch_profiles, submission_from_row, user_from_rows,
};
use super::schema::{courses, student_courses, submissions, users};

port_error_mapping!(EnrollmentRepositoryError);

/// Diesel implementation of [`EnrollmentRepository`].
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn is_enrolled(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<bool, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            student_courses::table.find((student.get(), course.get())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(|err| map_read_error(err, "check enrollment"))
    }

    async fn enroll(
        &self,
        student: UserId,
        course: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<(), EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(student_courses::table)
            .values(NewEnrollmentRow {
                student_id: student.get(),
                course_id: course.get(),
                enrolled_at,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, "enroll", |_| format!("{student}:{course}")))
    }

    async fn withdraw(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<bool, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(student_courses::table.find((student.get(), course.get())))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, "withdraw", |_| format!("{student}:{course}")))?;
        Ok(removed > 0)
    }

    async fn courses_for_student(
        &self,
        student: UserId,
    ) -> Result<Vec<Course>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let student = student.get();
        conn.build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let rows = courses::table
                        .inner_join(student_courses::table)
                        .filter(student_courses::student_id.eq(student))
                        .order(courses::id.asc())
                        .select(CourseRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_course_children(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "list student courses"))?
            .into_iter()
            .map(|bundle| course_from_rows(bundle).map_err(EnrollmentRepositoryError::query))
            .collect()
    }

    async fn roster(&self, course: CourseId) -> Result<Vec<User>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let course = course.get();
        conn.build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let enrolled = student_courses::table
                        .filter(student_courses::course_id.eq(course))
                        .select(student_courses::student_id);
                    let rows = users::table
                        .filter(users::id.eq_any(enrolled))
                        .order(users::id.asc())
                        .select(UserRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_profiles(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "load roster"))?
            .into_iter()
            .map(|bundle| user_from_rows(bundle).map_err(EnrollmentRepositoryError::query))
            .collect()
    }

    async fn record_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let assignment = submission.assignment_id.get();
        let student = submission.student_id;
        let row = diesel::insert_into(submissions::table)
            .values(NewSubmissionRow {
                assignment_id: assignment,
                student_id: student.get(),
                submitted_at: submission.submitted_at,
                file_reference: submission.file_reference.as_deref(),
            })
            .returning(SubmissionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                map_write_error(err, "record submission", |_| format!("{assignment}:{student}"))
            })?;
        Ok(submission_from_row(row))
    }
}
