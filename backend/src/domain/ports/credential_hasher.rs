//! Driven port for password hashing.

use crate::domain::{CredentialHash, Password};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHashError {
        /// Hash computation failed.
        Hash { message: String } => "credential hashing failed: {message}",
        /// The stored hash could not be parsed.
        Malformed { message: String } => "stored credential is malformed: {message}",
    }
}

/// One-way password hashing with embedded salt.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &Password) -> Result<CredentialHash, CredentialHashError>;

    /// `Ok(false)` for a wrong password; `Err` only when the hash is unusable.
    fn verify(
        &self,
        password: &Password,
        hash: &CredentialHash,
    ) -> Result<bool, CredentialHashError>;
}
