//! Multi-entity mutations that must appear atomic.
//!
//! Course deletion is expressed as an explicit, ordered [`CourseDeletionPlan`]
//! which the course store executes step by step inside one transaction.
//! Registration writes the user row and its role profile together; course
//! creation and update write the course row with its schedule children.

use std::fmt;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{CourseRepository, CredentialHasher, UserRepository};
use super::store_errors::{map_course_error, map_hash_error, map_user_error};
use super::{
    AccountStatus, Course, CourseChanges, CourseId, Email, Error, NewCourse, NewUser, Password,
    PersonName, RoleProfile, User,
};

/// One step of a course deletion, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    UnlinkEnrollments,
    DeleteSubmissions,
    DeleteAssignments,
    DeleteSchedules,
    DeleteCourse,
}

impl CascadeStep {
    pub const ORDER: [Self; 5] = [
        Self::UnlinkEnrollments,
        Self::DeleteSubmissions,
        Self::DeleteAssignments,
        Self::DeleteSchedules,
        Self::DeleteCourse,
    ];
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnlinkEnrollments => "unlink_enrollments",
            Self::DeleteSubmissions => "delete_submissions",
            Self::DeleteAssignments => "delete_assignments",
            Self::DeleteSchedules => "delete_schedules",
            Self::DeleteCourse => "delete_course",
        })
    }
}

/// Ordered removal of a course and everything it owns.
///
/// Students and the teacher are never touched; only their links to the
/// course disappear.
///
/// # Examples
/// ```
/// use campus_records::domain::{CascadeStep, CourseDeletionPlan, CourseId};
///
/// let plan = CourseDeletionPlan::for_course(CourseId::new(3));
/// assert_eq!(plan.steps().first(), Some(&CascadeStep::UnlinkEnrollments));
/// assert_eq!(plan.steps().last(), Some(&CascadeStep::DeleteCourse));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDeletionPlan {
    course: CourseId,
    steps: Vec<CascadeStep>,
}

impl CourseDeletionPlan {
    pub fn for_course(course: CourseId) -> Self {
        Self {
            course,
            steps: CascadeStep::ORDER.to_vec(),
        }
    }

    pub fn course(&self) -> CourseId {
        self.course
    }

    pub fn steps(&self) -> &[CascadeStep] {
        &self.steps
    }
}

/// Validated registration for any role.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: PersonName,
    pub email: Email,
    pub password: Password,
    pub profile: RoleProfile,
}

/// Coordinates registration and course writes across stores.
pub struct LifecycleCoordinator<U, C, H> {
    users: Arc<U>,
    courses: Arc<C>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, C, H> Clone for LifecycleCoordinator<U, C, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            courses: Arc::clone(&self.courses),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U, C, H> LifecycleCoordinator<U, C, H>
where
    U: UserRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    pub fn new(users: Arc<U>, courses: Arc<C>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            courses,
            hasher,
            clock,
        }
    }

    /// Create an ACTIVE user with its role profile.
    ///
    /// Email and role-number uniqueness are checked up front for a clear
    /// error; the store's unique indexes still catch concurrent races.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            name,
            email,
            password,
            profile,
        } = registration;

        if self
            .users
            .exists_by_email(&email)
            .await
            .map_err(map_user_error)?
        {
            return Err(Error::duplicate("email", email.as_str()));
        }
        self.ensure_number_free(&profile).await?;

        let credential = self.hasher.hash(&password).map_err(map_hash_error)?;
        let user = self
            .users
            .create(NewUser {
                name,
                email,
                credential,
                status: AccountStatus::Active,
                profile,
                created_at: self.clock.utc(),
            })
            .await
            .map_err(map_user_error)?;
        info!(user = %user.id(), role = %user.role(), "registered user");
        Ok(user)
    }

    async fn ensure_number_free(&self, profile: &RoleProfile) -> Result<(), Error> {
        match profile {
            RoleProfile::Admin => Ok(()),
            RoleProfile::Student(student) => {
                let number = student.student_number();
                let taken = self
                    .users
                    .find_by_student_number(number)
                    .await
                    .map_err(map_user_error)?;
                match taken {
                    Some(_) => Err(Error::duplicate("studentId", number.as_str())),
                    None => Ok(()),
                }
            }
            RoleProfile::Teacher(teacher) => {
                let number = teacher.teacher_number();
                let taken = self
                    .users
                    .find_by_teacher_number(number)
                    .await
                    .map_err(map_user_error)?;
                match taken {
                    Some(_) => Err(Error::duplicate("teacherId", number.as_str())),
                    None => Ok(()),
                }
            }
        }
    }

    /// Persist a course and its schedules as one store write.
    pub async fn create_course(&self, course: NewCourse) -> Result<Course, Error> {
        let created = self
            .courses
            .create(course)
            .await
            .map_err(map_course_error)?;
        info!(
            course = %created.id,
            code = %created.code(),
            schedules = created.schedules.len(),
            "created course"
        );
        Ok(created)
    }

    /// Apply course changes. A supplied schedule list replaces the stored
    /// set in the same store write.
    pub async fn update_course(&self, changes: CourseChanges) -> Result<Course, Error> {
        let id = changes.id;
        let replaces_schedules = changes.schedules.is_some();
        let course = self
            .courses
            .update(changes)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(format!("course {id} not found")))?;
        info!(course = %id, replaces_schedules, "updated course");
        Ok(course)
    }

    /// Run the cascade for an existing course.
    pub async fn delete_course(&self, id: CourseId) -> Result<(), Error> {
        let course = self
            .courses
            .find_by_id(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(format!("course {id} not found")))?;

        let plan = CourseDeletionPlan::for_course(course.id);
        self.courses.delete(&plan).await.map_err(map_course_error)?;
        info!(course = %id, code = %course.code(), "deleted course");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
