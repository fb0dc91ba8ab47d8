//! Driving port for login.
//!
//! Inbound adapters call this port to turn presented credentials into the
//! identity stored in the session, without importing persistence concerns.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, LoginCredentials};

/// Use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials; unknown emails, wrong passwords and suspended
    /// accounts all fail with `unauthorized`.
    async fn authenticate(&self, credentials: &LoginCredentials)
    -> Result<AuthenticatedUser, Error>;
}
