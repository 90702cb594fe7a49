//! Repository traits for data access layer
//!
//! This module defines the repository interfaces that services use to interact with storage.
//! Storage backends implement [`UserRepository`] for accounts,
//! [`EventRepository`] for events and [`RepositoryProvider`] to expose both
//! together with lifecycle methods.

pub mod adapter;
pub mod event;
pub mod user;

#[cfg(test)]
pub(crate) mod memory;

pub use adapter::{EventRepositoryAdapter, UserRepositoryAdapter};
pub use event::EventRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

/// Unified access to every repository plus storage lifecycle.
#[async_trait]
pub trait RepositoryProvider: Send + Sync + 'static {
    /// The user repository implementation type
    type UserRepo: UserRepository;

    /// The event repository implementation type
    type EventRepo: EventRepository;

    /// Get the user repository
    fn user(&self) -> &Self::UserRepo;

    /// Get the event repository
    fn event(&self) -> &Self::EventRepo;

    /// Apply pending schema migrations
    async fn migrate(&self) -> Result<(), Error>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> Result<(), Error>;
}
