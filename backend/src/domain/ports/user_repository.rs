//! Driven port for the identity directory store.
//!
//! A user and its role profile (student or teacher row) are written together;
//! adapters must make [`UserRepository::create`] atomic.

use async_trait::async_trait;

use crate::domain::{Email, NewUser, Role, StudentNumber, TeacherNumber, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    store UserPersistenceError => "user repository"
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    async fn exists_by_email(&self, email: &Email) -> Result<bool, UserPersistenceError>;

    async fn find_by_student_number(
        &self,
        number: &StudentNumber,
    ) -> Result<Option<User>, UserPersistenceError>;

    async fn find_by_teacher_number(
        &self,
        number: &TeacherNumber,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// All users, optionally restricted to one role, ordered by id.
    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError>;

    /// Insert the user row and its role profile in one transaction.
    async fn create(&self, user: NewUser) -> Result<User, UserPersistenceError>;

    /// Overwrite base fields and the role profile of an existing user.
    ///
    /// Returns `Ok(false)` when no row matched.
    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError>;
}
