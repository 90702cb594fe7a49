use crate::{Error, Event, EventId, NewEvent};
use async_trait::async_trait;

/// Repository for events
#[async_trait]
pub trait EventRepository: Send + Sync + 'static {
    /// Persist a new event
    async fn create(&self, event: NewEvent) -> Result<Event, Error>;

    /// Find an event by ID
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, Error>;

    /// Find every event whose title matches exactly, ordered by ID
    async fn find_by_title(&self, title: &str) -> Result<Vec<Event>, Error>;

    /// List all events ordered by ID
    async fn list(&self) -> Result<Vec<Event>, Error>;
}
