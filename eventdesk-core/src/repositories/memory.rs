//! In-memory repositories used by the service tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    CredentialRecord, Error, Event, EventId, NewEvent, NewUser, Role, User, UserId,
    error::AuthError,
    repositories::{EventRepository, UserRepository},
};

#[derive(Default)]
pub struct MockUserRepository {
    records: Mutex<BTreeMap<i64, CredentialRecord>>,
    next_id: Mutex<i64>,
}

impl MockUserRepository {
    /// Overwrite the stored salt and hash for a user, bypassing validation.
    pub async fn corrupt(&self, id: &UserId, salt: &str, password_hash: &str) {
        let mut records = self.records.lock().await;
        if let Some(record) = records.get_mut(&id.as_i64()) {
            record.salt = salt.to_string();
            record.password_hash = password_hash.to_string();
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, Error> {
        let mut records = self.records.lock().await;
        if records
            .values()
            .any(|record| record.user.username == new_user.username)
        {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let mut next_id = self.next_id.lock().await;
        *next_id += 1;

        let user = User::builder()
            .id(UserId::new(*next_id))
            .username(new_user.username)
            .role(new_user.role)
            .build()?;

        records.insert(
            *next_id,
            CredentialRecord {
                user: user.clone(),
                salt: new_user.salt,
                password_hash: new_user.password_hash,
            },
        );

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self
            .records
            .lock()
            .await
            .get(&id.as_i64())
            .map(|record| record.user.clone()))
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, Error> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .find(|record| record.user.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .map(|record| record.user.clone())
            .collect())
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<User, Error> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(&id.as_i64())
            .ok_or(AuthError::UserNotFound)?;
        record.user.role = role;
        record.user.updated_at = Utc::now();
        Ok(record.user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.records
            .lock()
            .await
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or(AuthError::UserNotFound.into())
    }
}

#[derive(Default)]
pub struct MockEventRepository {
    events: Mutex<BTreeMap<i64, Event>>,
}

#[async_trait]
impl EventRepository for MockEventRepository {
    async fn create(&self, event: NewEvent) -> Result<Event, Error> {
        let mut events = self.events.lock().await;
        let id = events.keys().next_back().map_or(1, |last| last + 1);
        let now = Utc::now();

        let event = Event {
            id: EventId::new(id),
            title: event.title,
            description: event.description,
            start_date: event.start_date,
            end_date: event.end_date,
            status: event.status,
            estimated_budget: event.estimated_budget,
            notes: event.notes,
            created_by: Some(event.created_by),
            created_at: now,
            updated_at: now,
        };
        events.insert(id, event.clone());

        Ok(event)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, Error> {
        Ok(self.events.lock().await.get(&id.as_i64()).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Vec<Event>, Error> {
        Ok(self
            .events
            .lock()
            .await
            .values()
            .filter(|event| event.title == title)
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Event>, Error> {
        Ok(self.events.lock().await.values().cloned().collect())
    }
}
