//! Driving port for administrative user management.

use async_trait::async_trait;

use crate::domain::{AccountStatus, CallerContext, Error, User, UserId};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self, caller: &CallerContext) -> Result<Vec<User>, Error>;

    /// Set the account status. Any transition is allowed.
    async fn update_status(
        &self,
        caller: &CallerContext,
        id: UserId,
        status: AccountStatus,
    ) -> Result<User, Error>;
}
