//! JWT session token issuer
//!
//! Mints HS256 tokens for authenticated users and validates them on later
//! requests. Tokens are self-contained, so validation needs no storage.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Header, decode, encode};

use crate::{
    Error, UserId,
    error::{CryptoError, SessionError, ValidationError},
};

use super::{JwtClaims, JwtConfig, Session, SessionToken};

/// Issues and validates signed, time-bound session tokens.
///
/// The issuer trusts its caller: `issue` must only be called for a user whose
/// credentials were already verified.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: JwtConfig,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create a new issuer signing with `config`, minting tokens valid for `ttl`.
    ///
    /// # Errors
    ///
    /// `ttl` must be at least one second since token timestamps have second
    /// resolution, and short enough that an expiry computed from now is a
    /// representable date.
    pub fn new(config: JwtConfig, ttl: Duration) -> Result<Self, Error> {
        if ttl < Duration::seconds(1) {
            return Err(ValidationError::InvalidField(
                "Token lifetime must be at least one second".to_string(),
            )
            .into());
        }
        expiry(Utc::now(), ttl)?;
        Ok(Self { config, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issue a token for `user_id`, valid from now for the configured lifetime.
    pub fn issue(&self, user_id: &UserId) -> Result<Session, Error> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<Session, Error> {
        let session = Session {
            token: SessionToken::new(""),
            user_id: *user_id,
            created_at: now,
            expires_at: expiry(now, self.ttl)?,
        };

        let claims = session.to_jwt_claims(self.config.issuer.clone());
        let header = Header::new(self.config.jwt_algorithm());

        let token = encode(&header, &claims, self.config.encoding_key())
            .map_err(|e| CryptoError::JwtSigning(format!("Failed to encode JWT: {e}")))?;

        Ok(Session {
            token: SessionToken::from(token),
            ..session
        })
    }

    /// Validate a token and return the user it was issued for.
    pub fn validate(&self, token: &SessionToken) -> Result<UserId, Error> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// A bad signature, an expired token and a malformed token all produce
    /// the same [`SessionError::Rejected`].
    pub fn validate_at(&self, token: &SessionToken, now: DateTime<Utc>) -> Result<UserId, Error> {
        let claims = self.verify_claims(token).ok_or(SessionError::Rejected)?;

        if now.timestamp() >= claims.exp {
            tracing::debug!(exp = claims.exp, "Rejected expired session token");
            return Err(SessionError::Rejected.into());
        }

        claims.sub.parse::<UserId>().map_err(|_| {
            tracing::debug!("Rejected session token with non-numeric subject");
            SessionError::Rejected.into()
        })
    }

    fn verify_claims(&self, token: &SessionToken) -> Option<JwtClaims> {
        if token.as_str().is_empty() {
            tracing::debug!("Rejected empty session token");
            return None;
        }

        match decode::<JwtClaims>(
            token.as_str(),
            self.config.decoding_key(),
            &self.config.get_validation(),
        ) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                None
            }
        }
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, Error> {
    now.checked_add_signed(ttl).ok_or_else(|| {
        ValidationError::InvalidField("Token expiry is out of range".to_string()).into()
    })
}
