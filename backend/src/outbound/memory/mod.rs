//! In-memory implementation of every driven repository port.
//!
//! Used when no database URL is configured and as the fixture store for
//! behaviour tests. Transactions are serialised behind one mutex: each runs
//! against a clone of the committed tables, and the clone replaces them only
//! when the whole transaction succeeds.

mod tables;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::ports::{
    CourseRepository, CourseRepositoryError, EnrollmentRepository, EnrollmentRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, CascadeStep, Course, CourseChanges, CourseCode,
    CourseDeletionPlan, CourseId, Email, NewCourse, NewSubmission, NewUser, Role, StudentNumber,
    Submission, TeacherNumber, User, UserId,
};

use self::tables::{StoreFault, Tables};

/// Point at which the next matching transaction fails and rolls back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// After a course row is written, before its schedules.
    ScheduleInsert,
    /// Before the given cascade step runs.
    Cascade(CascadeStep),
}

#[derive(Debug, Default)]
struct State {
    tables: Tables,
    fault: Option<FaultPoint>,
}

#[derive(Debug)]
enum StoreError {
    Poisoned,
    Fault(StoreFault),
}

impl From<StoreFault> for StoreError {
    fn from(value: StoreFault) -> Self {
        Self::Fault(value)
    }
}

macro_rules! store_error_into {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<StoreError> for $error {
                fn from(value: StoreError) -> Self {
                    match value {
                        StoreError::Poisoned => Self::connection("in-memory store lock poisoned"),
                        StoreError::Fault(StoreFault::Duplicate { field, value }) => {
                            Self::duplicate(field, value)
                        }
                        StoreError::Fault(
                            StoreFault::MissingReference(message) | StoreFault::Injected(message),
                        ) => Self::transaction(message),
                    }
                }
            }
        )+
    };
}

store_error_into!(
    UserPersistenceError,
    CourseRepositoryError,
    EnrollmentRepositoryError
);

fn trip(armed: &mut Option<FaultPoint>, point: FaultPoint) -> Result<(), StoreFault> {
    if *armed == Some(point) {
        *armed = None;
        return Err(StoreFault::Injected(format!("injected failure at {point:?}")));
    }
    Ok(())
}

/// Shared in-memory store; wrap in an `Arc` and hand the same instance to
/// every service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot failure; the transaction that reaches `point` rolls
    /// back and reports `TransactionFailed`.
    pub fn fail_at(&self, point: FaultPoint) {
        if let Ok(mut state) = self.state.lock() {
            state.fault = Some(point);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }

    fn read<T>(&self, op: impl FnOnce(&Tables) -> T) -> Result<T, StoreError> {
        let state = self.lock()?;
        Ok(op(&state.tables))
    }

    fn transact<T>(
        &self,
        operation: &str,
        op: impl FnOnce(&mut Tables, &mut Option<FaultPoint>) -> Result<T, StoreFault>,
    ) -> Result<T, StoreError> {
        let mut state = self.lock()?;
        let mut working = state.tables.clone();
        match op(&mut working, &mut state.fault) {
            Ok(value) => {
                state.tables = working;
                Ok(value)
            }
            Err(fault) => {
                debug!(%operation, ?fault, "in-memory transaction rolled back");
                Err(fault.into())
            }
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read(|tables| tables.users.get(&id).cloned())?)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read(|tables| {
            tables
                .users
                .values()
                .find(|user| user.email() == email)
                .cloned()
        })?)
    }

    async fn exists_by_email(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        Ok(self.read(|tables| tables.users.values().any(|user| user.email() == email))?)
    }

    async fn find_by_student_number(
        &self,
        number: &StudentNumber,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read(|tables| {
            tables
                .users
                .values()
                .find(|user| user.student().map(|p| p.student_number()) == Some(number))
                .cloned()
        })?)
    }

    async fn find_by_teacher_number(
        &self,
        number: &TeacherNumber,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read(|tables| {
            tables
                .users
                .values()
                .find(|user| user.teacher().map(|p| p.teacher_number()) == Some(number))
                .cloned()
        })?)
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.read(|tables| {
            tables
                .users
                .values()
                .filter(|user| role.is_none_or(|role| user.role() == role))
                .cloned()
                .collect()
        })?)
    }

    async fn create(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        Ok(self.transact("create user", |tables, _| tables.insert_user(user))?)
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        Ok(self.transact("update user", |tables, _| tables.replace_user(user))?)
    }
}

#[async_trait]
impl CourseRepository for MemoryStore {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(self.read(|tables| tables.course_view(id))?)
    }

    async fn find_by_code(
        &self,
        code: &CourseCode,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(self.read(|tables| {
            tables
                .courses
                .values()
                .find(|course| course.code() == code)
                .and_then(|course| tables.course_view(course.id))
        })?)
    }

    async fn list(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        Ok(self.read(|tables| {
            tables
                .courses
                .keys()
                .filter_map(|id| tables.course_view(*id))
                .collect()
        })?)
    }

    async fn list_by_teacher(&self, teacher: UserId) -> Result<Vec<Course>, CourseRepositoryError> {
        Ok(self.read(|tables| {
            tables
                .courses
                .values()
                .filter(|course| course.teacher.id == teacher)
                .filter_map(|course| tables.course_view(course.id))
                .collect()
        })?)
    }

    async fn create(&self, course: NewCourse) -> Result<Course, CourseRepositoryError> {
        let created = self.transact("create course", |tables, armed| {
            let id = tables.insert_course(&course)?;
            trip(armed, FaultPoint::ScheduleInsert)?;
            tables.attach_schedules(id, course.schedules)?;
            Ok(tables.course_view(id))
        })?;
        created.ok_or_else(|| CourseRepositoryError::query("created course vanished"))
    }

    async fn update(
        &self,
        changes: CourseChanges,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let id = changes.id;
        Ok(self.transact("update course", |tables, armed| {
            let replaces = changes.schedules.is_some();
            if !tables.apply_course_changes(changes)? {
                return Ok(None);
            }
            if replaces {
                trip(armed, FaultPoint::ScheduleInsert)?;
            }
            Ok(tables.course_view(id))
        })?)
    }

    async fn delete(&self, plan: &CourseDeletionPlan) -> Result<(), CourseRepositoryError> {
        let course = plan.course();
        Ok(self.transact("delete course", |tables, armed| {
            for step in plan.steps() {
                trip(armed, FaultPoint::Cascade(*step))?;
                let removed = tables.run_cascade_step(*step, course);
                debug!(%course, %step, removed, "cascade step applied");
            }
            Ok(())
        })?)
    }

    async fn create_assignment(
        &self,
        course: CourseId,
        draft: AssignmentDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Assignment, CourseRepositoryError> {
        Ok(self.transact("create assignment", |tables, _| {
            tables.insert_assignment(course, draft, created_at)
        })?)
    }

    async fn list_assignments(
        &self,
        course: CourseId,
    ) -> Result<Vec<Assignment>, CourseRepositoryError> {
        Ok(self.read(|tables| {
            let mut listed: Vec<Assignment> = tables
                .assignments
                .values()
                .filter(|assignment| assignment.course_id == course)
                .cloned()
                .collect();
            listed.sort_by_key(|assignment| (assignment.due_date, assignment.id));
            listed
        })?)
    }

    async fn find_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, CourseRepositoryError> {
        Ok(self.read(|tables| tables.assignments.get(&id).cloned())?)
    }
}

#[async_trait]
impl EnrollmentRepository for MemoryStore {
    async fn is_enrolled(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<bool, EnrollmentRepositoryError> {
        Ok(self.read(|tables| tables.enrollments.contains_key(&(student, course)))?)
    }

    async fn enroll(
        &self,
        student: UserId,
        course: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<(), EnrollmentRepositoryError> {
        Ok(self.transact("enroll", |tables, _| {
            tables.insert_enrollment(student, course, enrolled_at)
        })?)
    }

    async fn withdraw(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<bool, EnrollmentRepositoryError> {
        Ok(self.transact("withdraw", |tables, _| {
            Ok(tables.enrollments.remove(&(student, course)).is_some())
        })?)
    }

    async fn courses_for_student(
        &self,
        student: UserId,
    ) -> Result<Vec<Course>, EnrollmentRepositoryError> {
        Ok(self.read(|tables| {
            tables
                .enrollments
                .keys()
                .filter(|(enrolled, _)| *enrolled == student)
                .filter_map(|(_, course)| tables.course_view(*course))
                .collect()
        })?)
    }

    async fn roster(&self, course: CourseId) -> Result<Vec<User>, EnrollmentRepositoryError> {
        Ok(self.read(|tables| {
            tables
                .enrollments
                .keys()
                .filter(|(_, enrolled)| *enrolled == course)
                .filter_map(|(student, _)| tables.users.get(student).cloned())
                .collect()
        })?)
    }

    async fn record_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, EnrollmentRepositoryError> {
        Ok(self.transact("record submission", |tables, _| {
            tables.insert_submission(submission)
        })?)
    }
}
