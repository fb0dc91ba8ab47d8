//! Domain ports for the hexagonal boundary.
//!
//! Driving ports are the use-case traits inbound adapters call; driven ports
//! are the store and hasher traits outbound adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod course_catalog;
mod course_repository;
mod credential_hasher;
mod enrollment_ledger;
mod enrollment_repository;
mod login_service;
mod student_records;
mod teacher_records;
mod user_directory;
mod user_repository;

pub use course_catalog::{CourseCatalog, CourseForm};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
pub use enrollment_ledger::EnrollmentLedger;
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{EnrollmentRepository, EnrollmentRepositoryError};
pub use login_service::LoginService;
pub use student_records::{StudentRecord, StudentRecords, StudentRegistration, StudentUpdate};
pub use teacher_records::{TeacherRecord, TeacherRecords, TeacherRegistration, TeacherUpdate};
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
