//! Domain entities, the authorization gate, and the use-case services.
//!
//! Public surface:
//! - Entities: [`User`] with its [`RoleProfile`], [`Course`] with its
//!   [`Schedule`] set, [`Assignment`], [`Submission`].
//! - [`authorize`] and [`CallerContext`]: the role and ownership gate every
//!   service consults before touching a store.
//! - [`LifecycleCoordinator`] and [`CourseDeletionPlan`]: multi-entity
//!   mutations.
//! - Services implementing the driving ports in [`ports`].
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.

pub mod assignment;
pub mod auth;
pub mod authorization;
pub mod catalog_service;
pub mod course;
pub mod enrollment_service;
pub mod error;
pub mod identity_service;
pub mod lifecycle;
pub mod ports;
mod store_errors;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod user;

pub use self::assignment::{
    Assignment, AssignmentDraft, AssignmentId, AssignmentValidationError, NewSubmission,
    Submission, SubmissionId,
};
pub use self::auth::{
    AuthenticatedUser, LoginCredentials, LoginValidationError, PASSWORD_MIN_LEN, Password,
};
pub use self::authorization::{CallerContext, Operation, Resource, authorize};
pub use self::catalog_service::CatalogService;
pub use self::course::{
    Course, CourseChanges, CourseCode, CourseDetails, CourseId, CourseTeacher,
    CourseValidationError, DayOfWeek, NewCourse, Schedule, ScheduleDraft, ScheduleId,
};
pub use self::enrollment_service::EnrollmentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity_service::IdentityService;
pub use self::lifecycle::{CascadeStep, CourseDeletionPlan, LifecycleCoordinator, Registration};
pub use self::trace_id::TraceId;
pub use self::user::{
    AccountStatus, CredentialHash, Email, NAME_MAX, NewUser, PersonName, Role, RoleMismatch,
    RoleProfile, StudentNumber, StudentProfile, TeacherNumber, TeacherProfile, User, UserId,
    UserValidationError,
};
