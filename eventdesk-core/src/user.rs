//! User accounts and stored credentials
//!
//! The account table behind this module is defined as follows:
//!
//! | Field           | Type       | Description                                      |
//! | --------------- | ---------- | ------------------------------------------------ |
//! | `id`            | `i64`      | Storage-assigned identifier, never reused.       |
//! | `username`      | `String`   | Unique, stored trimmed and lowercased.           |
//! | `salt`          | `String`   | Per-credential random salt.                      |
//! | `password_hash` | `String`   | Hex PBKDF2 derivation of the password and salt.  |
//! | `role`          | `Role`     | Access level, `user` unless promoted.            |
//! | `created_at`    | `DateTime` | The timestamp when the account was created.      |
//! | `updated_at`    | `DateTime` | The timestamp when the account was last updated. |
//!
//! [`User`] is the public projection handed to services and HTTP handlers;
//! [`CredentialRecord`] additionally carries the salt and hash and only
//! travels between storage and the password service.
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, error::ValidationError};

/// A unique, stable identifier for a specific user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        UserId(id)
    }

    pub fn into_inner(self) -> i64 {
        self.0
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(UserId)
            .map_err(|_| ValidationError::InvalidField(format!("Invalid user ID: {s}")))
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access level of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representation of an account as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    pub username: String,

    pub role: Role,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    username: Option<String>,
    role: Role,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn build(self) -> Result<User, Error> {
        let now = Utc::now();
        Ok(User {
            id: self
                .id
                .ok_or(ValidationError::MissingField("User ID is required".to_string()))?,
            username: self
                .username
                .ok_or(ValidationError::MissingField("Username is required".to_string()))?,
            role: self.role,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// A stored account together with its salt and derived hash.
#[derive(Clone)]
pub struct CredentialRecord {
    pub user: User,
    pub salt: String,
    pub password_hash: String,
}

impl CredentialRecord {
    /// Salt and hash are written together; a record missing either is corrupt.
    pub fn is_complete(&self) -> bool {
        !self.salt.is_empty() && !self.password_hash.is_empty()
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// An account about to be persisted.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub salt: String,
    pub password_hash: String,
    pub role: Role,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
