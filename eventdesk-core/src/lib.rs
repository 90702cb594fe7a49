//! Core functionality for the eventdesk project
//!
//! This crate holds the pieces that do not depend on a database or a web
//! framework: the credential hasher, the session token issuer, the account
//! and event models and the services that tie them to their repositories.
//!
//! See [`crypto`] for password hashing, [`TokenIssuer`] for session tokens and
//! [`services`] for registration and login.
pub mod crypto;
pub mod error;
pub mod event;
pub mod repositories;
pub mod services;
pub mod session;
pub mod user;
pub mod validation;

pub use crypto::PasswordHash;
pub use error::Error;
pub use event::{Event, EventId, EventStatus, NewEvent};
pub use repositories::{EventRepository, RepositoryProvider, UserRepository};
pub use session::{JwtClaims, JwtConfig, Session, SessionToken, TokenIssuer};
pub use user::{CredentialRecord, NewUser, Role, User, UserId};
