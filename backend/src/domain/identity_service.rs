//! Identity directory services: login, account administration, and the
//! student and teacher record use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::lifecycle::{LifecycleCoordinator, Registration};
use super::ports::{
    CourseRepository, CredentialHasher, EnrollmentRepository, LoginService, StudentRecord,
    StudentRecords, StudentRegistration, StudentUpdate, TeacherRecord, TeacherRecords,
    TeacherRegistration, TeacherUpdate, UserDirectory, UserRepository,
};
use super::store_errors::{map_course_error, map_enrollment_error, map_hash_error, map_user_error};
use super::{
    AccountStatus, AuthenticatedUser, CallerContext, Course, Error, LoginCredentials, Operation,
    Resource, Role, RoleMismatch, RoleProfile, StudentNumber, TeacherNumber, User, UserId,
    authorize,
};

fn role_mismatch(error: RoleMismatch) -> Error {
    Error::internal(format!(
        "expected a {} record, found {}",
        error.expected, error.actual
    ))
}

/// Service implementing the identity driving ports over the user store.
pub struct IdentityService<U, E, C, H> {
    users: Arc<U>,
    enrollments: Arc<E>,
    courses: Arc<C>,
    hasher: Arc<H>,
    lifecycle: LifecycleCoordinator<U, C, H>,
    clock: Arc<dyn Clock>,
}

impl<U, E, C, H> IdentityService<U, E, C, H>
where
    U: UserRepository,
    E: EnrollmentRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    pub fn new(
        users: Arc<U>,
        enrollments: Arc<E>,
        courses: Arc<C>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lifecycle = LifecycleCoordinator::new(
            Arc::clone(&users),
            Arc::clone(&courses),
            Arc::clone(&hasher),
            Arc::clone(&clock),
        );
        Self {
            users,
            enrollments,
            courses,
            hasher,
            lifecycle,
            clock,
        }
    }

    async fn require_role(&self, id: UserId, role: Role) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .filter(|user| user.role() == role)
            .ok_or_else(|| Error::not_found(format!("{} {id} not found", role_label(role))))
    }

    async fn enrolled_courses(&self, student: UserId) -> Result<Vec<Course>, Error> {
        self.enrollments
            .courses_for_student(student)
            .await
            .map_err(map_enrollment_error)
    }

    async fn student_record(&self, user: User) -> Result<StudentRecord, Error> {
        let enrolled_courses = self.enrolled_courses(user.id()).await?;
        Ok(StudentRecord {
            user,
            enrolled_courses,
        })
    }

    async fn teacher_record(&self, user: User) -> Result<TeacherRecord, Error> {
        let assigned_courses = self
            .courses
            .list_by_teacher(user.id())
            .await
            .map_err(map_course_error)?;
        Ok(TeacherRecord {
            user,
            assigned_courses,
        })
    }

    async fn save(&self, user: &User) -> Result<(), Error> {
        if self.users.update(user).await.map_err(map_user_error)? {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {} not found", user.id())))
        }
    }

    async fn register_as_student(&self, registration: StudentRegistration) -> Result<User, Error> {
        self.lifecycle
            .register(Registration {
                name: registration.name,
                email: registration.email,
                password: registration.password,
                profile: RoleProfile::Student(registration.profile),
            })
            .await
    }

    /// A number change must not collide with another student's number.
    async fn ensure_student_number_free(
        &self,
        id: UserId,
        number: &StudentNumber,
    ) -> Result<(), Error> {
        let holder = self
            .users
            .find_by_student_number(number)
            .await
            .map_err(map_user_error)?;
        match holder {
            Some(other) if other.id() != id => {
                warn!(student = %id, %number, "student number already taken");
                Err(Error::duplicate("studentId", number.as_str()))
            }
            _ => Ok(()),
        }
    }

    async fn ensure_teacher_number_free(
        &self,
        id: UserId,
        number: &TeacherNumber,
    ) -> Result<(), Error> {
        let holder = self
            .users
            .find_by_teacher_number(number)
            .await
            .map_err(map_user_error)?;
        match holder {
            Some(other) if other.id() != id => {
                warn!(teacher = %id, %number, "teacher number already taken");
                Err(Error::duplicate("teacherId", number.as_str()))
            }
            _ => Ok(()),
        }
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Teacher => "teacher",
        Role::Student => "student",
    }
}

#[async_trait]
impl<U, E, C, H> LoginService for IdentityService<U, E, C, H>
where
    U: UserRepository,
    E: EnrollmentRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let invalid = || Error::unauthorized("invalid credentials");
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            warn!("login attempt for unknown email");
            return Err(invalid());
        };

        let verified = self
            .hasher
            .verify(credentials.password(), user.credential())
            .map_err(map_hash_error)?;
        if !verified {
            warn!(user = %user.id(), "login attempt with wrong password");
            return Err(invalid());
        }
        if user.status() == AccountStatus::Suspended {
            warn!(user = %user.id(), "login attempt on suspended account");
            return Err(Error::unauthorized("account suspended"));
        }

        info!(user = %user.id(), role = %user.role(), "login succeeded");
        Ok(AuthenticatedUser {
            id: user.id(),
            name: user.name().clone(),
            email: user.email().clone(),
            role: user.role(),
        })
    }
}

#[async_trait]
impl<U, E, C, H> UserDirectory for IdentityService<U, E, C, H>
where
    U: UserRepository,
    E: EnrollmentRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    async fn list_users(&self, caller: &CallerContext) -> Result<Vec<User>, Error> {
        authorize(caller, Operation::List, Resource::Users)?;
        self.users.list(None).await.map_err(map_user_error)
    }

    async fn update_status(
        &self,
        caller: &CallerContext,
        id: UserId,
        status: AccountStatus,
    ) -> Result<User, Error> {
        authorize(caller, Operation::ChangeStatus, Resource::Users)?;
        let mut user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
        user.set_status(status, self.clock.utc());
        self.save(&user).await?;
        info!(user = %id, status = status.as_str(), "changed account status");
        Ok(user)
    }
}

#[async_trait]
impl<U, E, C, H> StudentRecords for IdentityService<U, E, C, H>
where
    U: UserRepository,
    E: EnrollmentRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    async fn get_student(
        &self,
        caller: &CallerContext,
        id: UserId,
    ) -> Result<StudentRecord, Error> {
        authorize(caller, Operation::Read, Resource::Student(Some(id)))?;
        let user = self.require_role(id, Role::Student).await?;
        self.student_record(user).await
    }

    async fn get_student_by_number(
        &self,
        caller: &CallerContext,
        number: &StudentNumber,
    ) -> Result<StudentRecord, Error> {
        authorize(caller, Operation::Read, Resource::Student(None))?;
        let user = self
            .users
            .find_by_student_number(number)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("student {number} not found")))?;
        self.student_record(user).await
    }

    async fn list_students(&self, caller: &CallerContext) -> Result<Vec<User>, Error> {
        authorize(caller, Operation::List, Resource::Student(None))?;
        self.users
            .list(Some(Role::Student))
            .await
            .map_err(map_user_error)
    }

    async fn update_student(
        &self,
        caller: &CallerContext,
        id: UserId,
        update: StudentUpdate,
    ) -> Result<StudentRecord, Error> {
        authorize(caller, Operation::Update, Resource::Student(Some(id)))?;
        let mut user = self.require_role(id, Role::Student).await?;
        self.ensure_student_number_free(id, update.profile.student_number())
            .await?;

        let now = self.clock.utc();
        user.rename(update.name, now);
        user.replace_student_profile(update.profile, now)
            .map_err(role_mismatch)?;
        self.save(&user).await?;
        info!(student = %id, "updated student record");
        self.student_record(user).await
    }

    async fn student_courses(
        &self,
        caller: &CallerContext,
        id: UserId,
    ) -> Result<Vec<Course>, Error> {
        authorize(caller, Operation::Read, Resource::Student(Some(id)))?;
        self.require_role(id, Role::Student).await?;
        self.enrolled_courses(id).await
    }

    async fn register_student(
        &self,
        caller: &CallerContext,
        registration: StudentRegistration,
    ) -> Result<User, Error> {
        authorize(caller, Operation::Create, Resource::Student(None))?;
        self.register_as_student(registration).await
    }

    async fn self_register_student(
        &self,
        registration: StudentRegistration,
    ) -> Result<User, Error> {
        self.register_as_student(registration).await
    }
}

#[async_trait]
impl<U, E, C, H> TeacherRecords for IdentityService<U, E, C, H>
where
    U: UserRepository,
    E: EnrollmentRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    async fn get_teacher(
        &self,
        caller: &CallerContext,
        id: UserId,
    ) -> Result<TeacherRecord, Error> {
        authorize(caller, Operation::Read, Resource::Teacher(Some(id)))?;
        let user = self.require_role(id, Role::Teacher).await?;
        self.teacher_record(user).await
    }

    async fn get_teacher_by_number(
        &self,
        caller: &CallerContext,
        number: &TeacherNumber,
    ) -> Result<TeacherRecord, Error> {
        authorize(caller, Operation::Read, Resource::Teacher(None))?;
        let user = self
            .users
            .find_by_teacher_number(number)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("teacher {number} not found")))?;
        self.teacher_record(user).await
    }

    async fn list_teachers(&self, caller: &CallerContext) -> Result<Vec<User>, Error> {
        authorize(caller, Operation::List, Resource::Teacher(None))?;
        self.users
            .list(Some(Role::Teacher))
            .await
            .map_err(map_user_error)
    }

    async fn update_teacher(
        &self,
        caller: &CallerContext,
        id: UserId,
        update: TeacherUpdate,
    ) -> Result<TeacherRecord, Error> {
        authorize(caller, Operation::Update, Resource::Teacher(Some(id)))?;
        let mut user = self.require_role(id, Role::Teacher).await?;
        self.ensure_teacher_number_free(id, update.profile.teacher_number())
            .await?;

        let now = self.clock.utc();
        user.rename(update.name, now);
        user.replace_teacher_profile(update.profile, now)
            .map_err(role_mismatch)?;
        self.save(&user).await?;
        info!(teacher = %id, "updated teacher record");
        self.teacher_record(user).await
    }

    async fn register_teacher(
        &self,
        caller: &CallerContext,
        registration: TeacherRegistration,
    ) -> Result<User, Error> {
        authorize(caller, Operation::Create, Resource::Teacher(None))?;
        self.lifecycle
            .register(Registration {
                name: registration.name,
                email: registration.email,
                password: registration.password,
                profile: RoleProfile::Teacher(registration.profile),
            })
            .await
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
