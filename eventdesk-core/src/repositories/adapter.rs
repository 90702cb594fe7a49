//! Adapters letting services hold an `Arc` to a provider's repositories

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    CredentialRecord, Error, Event, EventId, NewEvent, NewUser, Role, User, UserId,
    repositories::{EventRepository, RepositoryProvider, UserRepository},
};

pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, Error> {
        self.provider
            .user()
            .find_credentials_by_username(username)
            .await
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        self.provider.user().list().await
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<User, Error> {
        self.provider.user().update_role(id, role).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.provider.user().delete(id).await
    }
}

pub struct EventRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> EventRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> EventRepository for EventRepositoryAdapter<R> {
    async fn create(&self, event: NewEvent) -> Result<Event, Error> {
        self.provider.event().create(event).await
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, Error> {
        self.provider.event().find_by_id(id).await
    }

    async fn find_by_title(&self, title: &str) -> Result<Vec<Event>, Error> {
        self.provider.event().find_by_title(title).await
    }

    async fn list(&self) -> Result<Vec<Event>, Error> {
        self.provider.event().list().await
    }
}
