//! Course catalog service: courses, their schedules, and assignments.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::lifecycle::LifecycleCoordinator;
use super::ports::{
    CourseCatalog, CourseForm, CourseRepository, CredentialHasher, UserRepository,
};
use super::store_errors::{map_course_error, map_user_error};
use super::{
    Assignment, AssignmentDraft, CallerContext, Course, CourseChanges, CourseCode, CourseId,
    CourseTeacher, Error, NewCourse, Operation, Resource, Role, TeacherNumber, UserId, authorize,
};

/// Service implementing [`CourseCatalog`].
pub struct CatalogService<U, C, H> {
    users: Arc<U>,
    courses: Arc<C>,
    lifecycle: LifecycleCoordinator<U, C, H>,
    clock: Arc<dyn Clock>,
}

impl<U, C, H> CatalogService<U, C, H>
where
    U: UserRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    pub fn new(
        users: Arc<U>,
        courses: Arc<C>,
        lifecycle: LifecycleCoordinator<U, C, H>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            courses,
            lifecycle,
            clock,
        }
    }

    /// Resolve a public teacher number to a user whose role is TEACHER.
    async fn resolve_teacher(&self, number: &TeacherNumber) -> Result<CourseTeacher, Error> {
        let teacher = self
            .users
            .find_by_teacher_number(number)
            .await
            .map_err(map_user_error)?
            .filter(|user| user.role() == Role::Teacher)
            .ok_or_else(|| Error::not_found(format!("teacher {number} not found")))?;
        Ok(CourseTeacher {
            id: teacher.id(),
            number: number.clone(),
        })
    }

    async fn require_course(&self, id: CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(format!("course {id} not found")))
    }

    /// `owner` is the course being updated, whose own code never conflicts.
    async fn ensure_code_free(&self, code: &CourseCode, owner: Option<CourseId>) -> Result<(), Error> {
        let holder = self
            .courses
            .find_by_code(code)
            .await
            .map_err(map_course_error)?;
        match holder {
            Some(existing) if Some(existing.id) != owner => {
                warn!(%code, holder = %existing.id, "course code already taken");
                Err(Error::duplicate("code", code.as_str()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<U, C, H> CourseCatalog for CatalogService<U, C, H>
where
    U: UserRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    async fn create_course(
        &self,
        caller: &CallerContext,
        form: CourseForm,
    ) -> Result<Course, Error> {
        authorize(caller, Operation::Create, Resource::Course)?;
        let teacher = self.resolve_teacher(&form.teacher).await?;
        self.ensure_code_free(&form.details.code, None).await?;

        self.lifecycle
            .create_course(NewCourse {
                details: form.details,
                teacher,
                schedules: form.schedules.unwrap_or_default(),
                created_at: self.clock.utc(),
            })
            .await
    }

    async fn update_course(
        &self,
        caller: &CallerContext,
        id: CourseId,
        form: CourseForm,
    ) -> Result<Course, Error> {
        authorize(caller, Operation::Update, Resource::Course)?;
        self.require_course(id).await?;
        self.ensure_code_free(&form.details.code, Some(id)).await?;
        let teacher = self.resolve_teacher(&form.teacher).await?;

        self.lifecycle
            .update_course(CourseChanges {
                id,
                details: form.details,
                teacher,
                schedules: form.schedules,
                updated_at: self.clock.utc(),
            })
            .await
    }

    async fn delete_course(&self, caller: &CallerContext, id: CourseId) -> Result<(), Error> {
        authorize(caller, Operation::Delete, Resource::Course)?;
        self.lifecycle.delete_course(id).await
    }

    async fn get_course(&self, caller: &CallerContext, id: CourseId) -> Result<Course, Error> {
        authorize(caller, Operation::Read, Resource::Course)?;
        self.require_course(id).await
    }

    async fn get_course_by_code(
        &self,
        caller: &CallerContext,
        code: &CourseCode,
    ) -> Result<Course, Error> {
        authorize(caller, Operation::Read, Resource::Course)?;
        self.courses
            .find_by_code(code)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(format!("course {code} not found")))
    }

    async fn courses_for_teacher(
        &self,
        caller: &CallerContext,
        teacher: UserId,
    ) -> Result<Vec<Course>, Error> {
        authorize(caller, Operation::List, Resource::Course)?;
        self.users
            .find_by_id(teacher)
            .await
            .map_err(map_user_error)?
            .filter(|user| user.role() == Role::Teacher)
            .ok_or_else(|| Error::not_found(format!("teacher {teacher} not found")))?;
        self.courses
            .list_by_teacher(teacher)
            .await
            .map_err(map_course_error)
    }

    async fn list_courses(&self, caller: &CallerContext) -> Result<Vec<Course>, Error> {
        authorize(caller, Operation::List, Resource::Course)?;
        self.courses.list().await.map_err(map_course_error)
    }

    async fn create_assignment(
        &self,
        caller: &CallerContext,
        course: CourseId,
        draft: AssignmentDraft,
    ) -> Result<Assignment, Error> {
        authorize(caller, Operation::Create, Resource::Assignment)?;
        self.require_course(course).await?;
        let assignment = self
            .courses
            .create_assignment(course, draft, self.clock.utc())
            .await
            .map_err(map_course_error)?;
        info!(course = %course, assignment = assignment.id.get(), "created assignment");
        Ok(assignment)
    }

    async fn list_assignments(
        &self,
        caller: &CallerContext,
        course: CourseId,
    ) -> Result<Vec<Assignment>, Error> {
        authorize(caller, Operation::List, Resource::Assignment)?;
        self.require_course(course).await?;
        self.courses
            .list_assignments(course)
            .await
            .map_err(map_course_error)
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
