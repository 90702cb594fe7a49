use crate::{Error, Session, SessionToken, TokenIssuer, UserId};
use chrono::Duration;

/// Service for session management operations
///
/// Sessions are signed tokens, so there is no repository behind this service.
#[derive(Debug, Clone)]
pub struct SessionService {
    issuer: TokenIssuer,
}

impl SessionService {
    /// Create a new SessionService around the given issuer
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }

    /// Create a new session for a user whose credentials were just verified
    pub fn create_session(&self, user_id: &UserId) -> Result<Session, Error> {
        let session = self.issuer.issue(user_id)?;
        tracing::debug!(user_id = %user_id, expires_at = %session.expires_at, "Issued session");
        Ok(session)
    }

    /// Resolve a session token to the user it was issued for
    pub fn get_session(&self, token: &SessionToken) -> Result<UserId, Error> {
        self.issuer.validate(token)
    }

    /// Lifetime of newly issued sessions
    pub fn ttl(&self) -> Duration {
        self.issuer.ttl()
    }
}
