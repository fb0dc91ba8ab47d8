//! Argon2id implementation of [`CredentialHasher`].
//!
//! Hashes are PHC strings with the salt embedded, so verification needs no
//! extra state.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};

use crate::domain::ports::{CredentialHashError, CredentialHasher};
use crate::domain::{CredentialHash, Password};

/// Argon2id with the crate's default cost parameters.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &Password) -> Result<CredentialHash, CredentialHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| CredentialHashError::hash(err.to_string()))?;
        Ok(CredentialHash::new(phc.to_string()))
    }

    fn verify(
        &self,
        password: &Password,
        hash: &CredentialHash,
    ) -> Result<bool, CredentialHashError> {
        let parsed = PasswordHash::new(hash.as_str())
            .map_err(|err| CredentialHashError::malformed(err.to_string()))?;
        match self
            .argon2
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(err) => Err(CredentialHashError::hash(err.to_string())),
        }
    }
}
