use crate::{CredentialRecord, Error, NewUser, Role, User, UserId};
use async_trait::async_trait;

/// Repository for user account and credential access
///
/// Implementations must bind every value as a query parameter; usernames
/// reach this trait already normalized.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// A taken username is reported as `AuthError::UserAlreadyExists`.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Load the stored salt and hash for a username
    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, Error>;

    /// List all users ordered by ID
    async fn list(&self) -> Result<Vec<User>, Error>;

    /// Change a user's role, returning the updated user
    async fn update_role(&self, id: &UserId, role: Role) -> Result<User, Error>;

    /// Delete a user by ID
    async fn delete(&self, id: &UserId) -> Result<(), Error>;
}
