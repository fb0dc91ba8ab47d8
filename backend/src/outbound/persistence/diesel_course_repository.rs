//! PostgreSQL-backed `CourseRepository`.
//!
//! Courses own their schedules and assignments. Create, update and the
//! cascade delete each run in one transaction so a failure leaves no
//! partial course behind. Reads that join a course to its children run in
//! one read-only repeatable-read transaction so they see a single snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, CascadeStep, Course, CourseChanges, CourseCode,
    CourseDeletionPlan, CourseId, NewCourse, ScheduleDraft, UserId,
};

use super::diesel_error_mapping::port_error_mapping;
use super::models::{
    AssignmentRow, CourseChangeset, CourseRow, NewAssignmentRow, NewCourseRow, NewScheduleRow,
};
use super::pool::DbPool;
use super::row_mapping::{
    CourseRows, assignment_from_row, course_from_rows, fetch_course_children,
};
use super::schema::{assignments, courses, schedules, student_courses, submissions};

port_error_mapping!(CourseRepositoryError);

/// Diesel implementation of [`CourseRepository`].
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_courses(bundles: Vec<CourseRows>) -> Result<Vec<Course>, CourseRepositoryError> {
    bundles
        .into_iter()
        .map(|bundle| course_from_rows(bundle).map_err(CourseRepositoryError::query))
        .collect()
}

async fn insert_schedules(
    conn: &mut AsyncPgConnection,
    course_id: i64,
    drafts: &[ScheduleDraft],
) -> QueryResult<()> {
    if drafts.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewScheduleRow<'_>> = drafts
        .iter()
        .map(|draft| NewScheduleRow {
            course_id,
            day: draft.day().as_str(),
            start_time: draft.start_time(),
            end_time: draft.end_time(),
            room: draft.room(),
        })
        .collect();
    diesel::insert_into(schedules::table)
        .values(&rows)
        .execute(conn)
        .await?;
    Ok(())
}

async fn load_course_rows(
    conn: &mut AsyncPgConnection,
    course_id: i64,
) -> QueryResult<Vec<CourseRows>> {
    let rows = courses::table
        .find(course_id)
        .select(CourseRow::as_select())
        .load(conn)
        .await?;
    fetch_course_children(conn, rows).await
}

async fn run_step(conn: &mut AsyncPgConnection, step: CascadeStep, id: i64) -> QueryResult<usize> {
    match step {
        CascadeStep::UnlinkEnrollments => {
            diesel::delete(student_courses::table.filter(student_courses::course_id.eq(id)))
                .execute(conn)
                .await
        }
        CascadeStep::DeleteSubmissions => {
            let owned = assignments::table
                .filter(assignments::course_id.eq(id))
                .select(assignments::id);
            diesel::delete(submissions::table.filter(submissions::assignment_id.eq_any(owned)))
                .execute(conn)
                .await
        }
        CascadeStep::DeleteAssignments => {
            diesel::delete(assignments::table.filter(assignments::course_id.eq(id)))
                .execute(conn)
                .await
        }
        CascadeStep::DeleteSchedules => {
            diesel::delete(schedules::table.filter(schedules::course_id.eq(id)))
                .execute(conn)
                .await
        }
        CascadeStep::DeleteCourse => diesel::delete(courses::table.find(id)).execute(conn).await,
    }
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = id.get();
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| async move { load_course_rows(conn, id).await }.scope_boxed())
            .await
            .map_err(|err| map_read_error(err, "find course by id"))?;
        Ok(to_courses(bundles)?.into_iter().next())
    }

    async fn find_by_code(
        &self,
        code: &CourseCode,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let code = code.as_str();
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let rows = courses::table
                        .filter(courses::code.eq(code))
                        .select(CourseRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_course_children(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "find course by code"))?;
        Ok(to_courses(bundles)?.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let rows = courses::table
                        .order(courses::id.asc())
                        .select(CourseRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_course_children(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "list courses"))?;
        to_courses(bundles)
    }

    async fn list_by_teacher(&self, teacher: UserId) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let teacher = teacher.get();
        let bundles = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let rows = courses::table
                        .filter(courses::teacher_id.eq(teacher))
                        .order(courses::id.asc())
                        .select(CourseRow::as_select())
                        .load(conn)
                        .await?;
                    fetch_course_children(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_read_error(err, "list courses by teacher"))?;
        to_courses(bundles)
    }

    async fn create(&self, course: NewCourse) -> Result<Course, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCourseRow {
            name: &course.details.name,
            code: course.details.code.as_str(),
            description: &course.details.description,
            teacher_id: course.teacher.id.get(),
            created_at: course.created_at,
            updated_at: course.created_at,
        };
        let drafts = course.schedules.as_slice();

        let bundles = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(courses::table)
                        .values(&row)
                        .returning(courses::id)
                        .get_result(conn)
                        .await?;
                    insert_schedules(conn, id, drafts).await?;
                    load_course_rows(conn, id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| {
                map_write_error(err, "create course", |_| {
                    course.details.code.as_str().to_owned()
                })
            })?;

        to_courses(bundles)?
            .into_iter()
            .next()
            .ok_or_else(|| CourseRepositoryError::query("created course vanished"))
    }

    async fn update(
        &self,
        changes: CourseChanges,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = changes.id.get();
        let changeset = CourseChangeset {
            name: &changes.details.name,
            code: changes.details.code.as_str(),
            description: &changes.details.description,
            teacher_id: changes.teacher.id.get(),
            updated_at: changes.updated_at,
        };
        let replacement = changes.schedules.as_deref();

        let bundles = conn
            .transaction(|conn| {
                async move {
                    let touched = diesel::update(courses::table.find(id))
                        .set(&changeset)
                        .execute(conn)
                        .await?;
                    if touched == 0 {
                        return Ok(Vec::new());
                    }
                    if let Some(drafts) = replacement {
                        diesel::delete(schedules::table.filter(schedules::course_id.eq(id)))
                            .execute(conn)
                            .await?;
                        insert_schedules(conn, id, drafts).await?;
                    }
                    load_course_rows(conn, id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| {
                map_write_error(err, "update course", |_| {
                    changes.details.code.as_str().to_owned()
                })
            })?;

        Ok(to_courses(bundles)?.into_iter().next())
    }

    async fn delete(&self, plan: &CourseDeletionPlan) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = plan.course().get();
        let steps = plan.steps();

        conn.transaction(|conn| {
            async move {
                for step in steps {
                    let removed = run_step(conn, *step, id).await?;
                    debug!(course = id, %step, removed, "cascade step applied");
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, "delete course", |_| id.to_string()))
    }

    async fn create_assignment(
        &self,
        course: CourseId,
        draft: AssignmentDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Assignment, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(assignments::table)
            .values(NewAssignmentRow {
                course_id: course.get(),
                title: draft.title(),
                description: draft.description(),
                due_date: draft.due_date(),
                total_points: draft.total_points(),
                created_at,
                updated_at: created_at,
            })
            .returning(AssignmentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, "create assignment", |_| draft.title().to_owned()))?;
        Ok(assignment_from_row(row))
    }

    async fn list_assignments(
        &self,
        course: CourseId,
    ) -> Result<Vec<Assignment>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = assignments::table
            .filter(assignments::course_id.eq(course.get()))
            .order(assignments::due_date.asc())
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_read_error(err, "list assignments"))?;
        Ok(rows.into_iter().map(assignment_from_row).collect())
    }

    async fn find_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = assignments::table
            .find(id.get())
            .select(AssignmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_read_error(err, "find assignment"))?;
        Ok(row.map(assignment_from_row))
    }
}
