//! Session management
//!
//! Sessions are stateless: a session is nothing more than a signed JWT that
//! names the user and when it stops being valid. The core session struct is
//! defined as follows:
//!
//! | Field        | Type           | Description                                   |
//! | ------------ | -------------- | --------------------------------------------- |
//! | `token`      | `SessionToken` | The compact HS256 JWT handed to the client.   |
//! | `user_id`    | `UserId`       | The unique identifier for the user.           |
//! | `created_at` | `DateTime`     | The timestamp when the token was issued.      |
//! | `expires_at` | `DateTime`     | The timestamp when the token stops verifying. |
//!
//! There is no revocation list. Once issued, a token stays valid until
//! `expires_at`; logging out only drops the client's copy.

pub mod issuer;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{Error, error::ValidationError, user::UserId};

pub use issuer::TokenIssuer;

/// An opaque-to-the-client session token (a compact JWT).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: &str) -> Self {
        SessionToken(token.to_string())
    }

    /// Get the inner token string
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Get a reference to the token string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// JWT claims for session tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject - user ID
    pub sub: String,
    /// Issued at in seconds (as UTC timestamp)
    pub iat: i64,
    /// Expiration time in seconds (as UTC timestamp)
    pub exp: i64,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Signing configuration for session tokens.
///
/// Only HMAC-SHA256 is supported. Keys are derived once here and shared by
/// every issue/validate call.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Issuer claim
    pub issuer: Option<String>,
}

impl JwtConfig {
    /// Create a new JWT configuration with HS256 algorithm
    ///
    /// # Errors
    ///
    /// An empty secret is rejected; there is no built-in fallback key.
    pub fn new_hs256(secret_key: impl AsRef<[u8]>) -> Result<Self, Error> {
        let secret_key = secret_key.as_ref();
        if secret_key.is_empty() {
            return Err(
                ValidationError::MissingField("JWT secret key is required".to_string()).into(),
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret_key),
            decoding_key: DecodingKey::from_secret(secret_key),
            issuer: None,
        })
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Get the algorithm to use with jsonwebtoken
    pub fn jwt_algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Get the validation configuration for JWT verification
    ///
    /// Expiry is checked by [`TokenIssuer`] against an explicit clock, so the
    /// library's own `exp` check and leeway are switched off here.
    pub fn get_validation(&self) -> Validation {
        let mut validation = Validation::new(self.jwt_algorithm());
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.jwt_algorithm())
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The signed token the client presents on later requests.
    pub token: SessionToken,

    /// The unique identifier for the user.
    pub user_id: UserId,

    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,

    /// The timestamp when the session will expire.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Convert session to JWT claims
    pub fn to_jwt_claims(&self, issuer: Option<String>) -> JwtClaims {
        JwtClaims {
            sub: self.user_id.to_string(),
            iat: self.created_at.timestamp(),
            exp: self.expires_at.timestamp(),
            iss: issuer,
        }
    }
}
