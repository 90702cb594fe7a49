use crate::{
    Error, Role, User, UserId, error::AuthError, repositories::UserRepository,
    validation::normalize_username,
};
use std::sync::Arc;

/// Service for account management operations
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.repository.find_by_id(user_id).await
    }

    /// Get a user by ID, failing when it does not exist
    pub async fn require_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound.into())
    }

    /// Get a user by username, matched case-insensitively
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let username = normalize_username(username)?;
        Ok(self
            .repository
            .find_credentials_by_username(&username)
            .await?
            .map(|record| record.user))
    }

    /// List every account, ordered by ID
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repository.list().await
    }

    /// Change the role of an account
    pub async fn change_role(&self, user_id: &UserId, role: Role) -> Result<User, Error> {
        let user = self.repository.update_role(user_id, role).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "Changed user role");
        Ok(user)
    }

    /// Delete an account
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.repository.delete(user_id).await?;
        tracing::info!(user_id = %user_id, "Deleted user");
        Ok(())
    }
}
