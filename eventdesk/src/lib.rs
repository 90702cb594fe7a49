//! # EventDesk
//!
//! The EventDesk service: users register with a username and password, log
//! in to receive a signed session token and record the office's events.
//! Administrators manage accounts and roles.
//!
//! Passwords are stored as salted PBKDF2-HMAC-SHA256 derivations and session
//! tokens are HS256 JWTs with a fixed lifetime. There is no server-side
//! session table; a token is valid until it expires.
//!
//! ## Example
//!
//! ```rust,no_run
//! use eventdesk::{EventDesk, JwtConfig, TokenIssuer};
//! use eventdesk_storage_sqlite::SqliteRepositoryProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repositories = Arc::new(SqliteRepositoryProvider::connect("sqlite::memory:").await?);
//!     let issuer = TokenIssuer::new(
//!         JwtConfig::new_hs256(b"change-me-to-a-long-random-secret")?,
//!         chrono::Duration::minutes(15),
//!     )?;
//!
//!     let desk = EventDesk::new(repositories, issuer);
//!     desk.migrate().await?;
//!
//!     desk.register_user("alice", "correct-horse").await?;
//!     let (user, session) = desk.login_user("alice", "correct-horse").await?;
//!     assert_eq!(desk.get_session(&session.token)?, user.id);
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use eventdesk_core::{
    RepositoryProvider,
    error::{AuthError, Error as CoreError, SessionError},
    repositories::{EventRepositoryAdapter, UserRepositoryAdapter},
    services::{EventService, PasswordService, SessionService, UserService},
};

/// Re-export core types from eventdesk_core
pub use eventdesk_core::{
    Event, EventId, EventStatus, JwtClaims, JwtConfig, NewEvent, Role, Session, SessionToken,
    TokenIssuer, User, UserId,
};

#[cfg(feature = "sqlite")]
pub use eventdesk_storage_sqlite::SqliteRepositoryProvider;

/// Errors returned by [`EventDesk`].
#[derive(Debug, thiserror::Error)]
pub enum EventDeskError {
    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The username is already taken
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Event not found")]
    EventNotFound,
    /// The session token is forged, expired, malformed or names a deleted user
    #[error("Session rejected")]
    SessionRejected,
    /// Request data failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Error when interacting with storage
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<CoreError> for EventDeskError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Auth(AuthError::InvalidCredentials) => EventDeskError::InvalidCredentials,
            CoreError::Auth(AuthError::UserAlreadyExists) => EventDeskError::UserAlreadyExists,
            CoreError::Auth(AuthError::UserNotFound) => EventDeskError::UserNotFound,
            CoreError::Session(SessionError::Rejected) => EventDeskError::SessionRejected,
            CoreError::Validation(e) => EventDeskError::ValidationError(e.to_string()),
            CoreError::Storage(e) => EventDeskError::StorageError(e.to_string()),
            CoreError::Crypto(e) => EventDeskError::InternalError(e.to_string()),
        }
    }
}

/// The coordinator that ties storage, password hashing and session tokens.
///
/// `EventDesk` is cheap to share behind an `Arc`; every method takes `&self`.
pub struct EventDesk<R: RepositoryProvider> {
    repositories: Arc<R>,
    user_service: Arc<UserService<UserRepositoryAdapter<R>>>,
    password_service: Arc<PasswordService<UserRepositoryAdapter<R>>>,
    session_service: Arc<SessionService>,
    event_service: Arc<EventService<EventRepositoryAdapter<R>>>,
}

impl<R: RepositoryProvider> EventDesk<R> {
    /// Create a new EventDesk around a repository provider and a token issuer
    pub fn new(repositories: Arc<R>, issuer: TokenIssuer) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let event_repo = Arc::new(EventRepositoryAdapter::new(repositories.clone()));

        Self {
            repositories,
            user_service: Arc::new(UserService::new(user_repo.clone())),
            password_service: Arc::new(PasswordService::new(user_repo)),
            session_service: Arc::new(SessionService::new(issuer)),
            event_service: Arc::new(EventService::new(event_repo)),
        }
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), EventDeskError> {
        self.repositories
            .migrate()
            .await
            .map_err(|e| EventDeskError::StorageError(e.to_string()))
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), EventDeskError> {
        self.repositories
            .health_check()
            .await
            .map_err(|e| EventDeskError::StorageError(e.to_string()))
    }

    /// Lifetime of the sessions this instance issues
    pub fn session_ttl(&self) -> chrono::Duration {
        self.session_service.ttl()
    }

    /// Register a user with a password and the default role
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, EventDeskError> {
        Ok(self.password_service.register(username, password).await?)
    }

    /// Check a username and password, then issue a session for the user
    ///
    /// # Returns
    ///
    /// Returns the user and session if the login is successful
    pub async fn login_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, Session), EventDeskError> {
        let user = self
            .password_service
            .authenticate(username, password)
            .await?;

        let session = self.create_session(&user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok((user, session))
    }

    /// Issue a session for a user whose credentials were already checked
    pub fn create_session(&self, user_id: &UserId) -> Result<Session, EventDeskError> {
        Ok(self.session_service.create_session(user_id)?)
    }

    /// Validate a session token and return the user it was issued for
    pub fn get_session(&self, token: &SessionToken) -> Result<UserId, EventDeskError> {
        Ok(self.session_service.get_session(token)?)
    }

    /// Validate a session token and load its user
    ///
    /// A valid token for an account that has since been deleted is rejected
    /// like any other bad token.
    pub async fn authenticate_session(
        &self,
        token: &SessionToken,
    ) -> Result<User, EventDeskError> {
        let user_id = self.get_session(token)?;

        self.user_service
            .get_user(&user_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %user_id, "Session names a missing user");
                EventDeskError::SessionRejected
            })
    }

    /// Get a user by their ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, EventDeskError> {
        Ok(self.user_service.get_user(user_id).await?)
    }

    /// List every account
    pub async fn list_users(&self) -> Result<Vec<User>, EventDeskError> {
        Ok(self.user_service.list_users().await?)
    }

    /// Change the role of an account
    pub async fn change_role(&self, user_id: &UserId, role: Role) -> Result<User, EventDeskError> {
        Ok(self.user_service.change_role(user_id, role).await?)
    }

    /// Delete an account
    ///
    /// Tokens already issued to the account stop working because
    /// [`EventDesk::authenticate_session`] no longer finds the user.
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), EventDeskError> {
        Ok(self.user_service.delete_user(user_id).await?)
    }

    /// Record a new event
    pub async fn create_event(&self, event: NewEvent) -> Result<Event, EventDeskError> {
        Ok(self.event_service.create_event(event).await?)
    }

    /// Get an event by its ID
    pub async fn get_event(&self, event_id: &EventId) -> Result<Event, EventDeskError> {
        self.event_service
            .get_event(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound)
    }

    /// Every event with exactly this title
    pub async fn find_events_by_title(&self, title: &str) -> Result<Vec<Event>, EventDeskError> {
        Ok(self.event_service.find_by_title(title).await?)
    }

    /// List every event, oldest first
    pub async fn list_events(&self) -> Result<Vec<Event>, EventDeskError> {
        Ok(self.event_service.list_events().await?)
    }

    /// Make sure an administrator account named `username` exists
    ///
    /// Creates the account with `password` when it is missing and promotes it
    /// when it exists with a lesser role. An existing account keeps its
    /// password. Running this again is a no-op.
    pub async fn ensure_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, EventDeskError> {
        match self
            .password_service
            .register_with_role(username, password, Role::Admin)
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Created administrator account");
                Ok(user)
            }
            Err(CoreError::Auth(AuthError::UserAlreadyExists)) => {
                let existing = self
                    .user_service
                    .find_by_username(username)
                    .await?
                    .ok_or(EventDeskError::UserNotFound)?;

                if existing.is_admin() {
                    return Ok(existing);
                }

                tracing::warn!(
                    user_id = %existing.id,
                    "Promoting existing account to administrator"
                );
                self.change_role(&existing.id, Role::Admin).await
            }
            Err(e) => Err(e.into()),
        }
    }
}
