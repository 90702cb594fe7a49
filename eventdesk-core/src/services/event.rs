use crate::{
    Error, Event, EventId, NewEvent, repositories::EventRepository, validation::validate_event,
};
use std::sync::Arc;

/// Service for creating and reading events
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate and store a new event
    ///
    /// The title is trimmed and blank optional text fields are stored as
    /// absent.
    pub async fn create_event(&self, event: NewEvent) -> Result<Event, Error> {
        let event = NewEvent {
            title: event.title.trim().to_string(),
            description: non_blank(event.description),
            notes: non_blank(event.notes),
            ..event
        };
        validate_event(&event)?;

        let event = self.repository.create(event).await?;
        tracing::info!(
            event_id = %event.id,
            status = %event.status,
            "Created event"
        );
        Ok(event)
    }

    pub async fn get_event(&self, event_id: &EventId) -> Result<Option<Event>, Error> {
        self.repository.find_by_id(event_id).await
    }

    /// Events whose title matches `title` exactly, after trimming
    pub async fn find_by_title(&self, title: &str) -> Result<Vec<Event>, Error> {
        self.repository.find_by_title(title.trim()).await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, Error> {
        self.repository.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        EventStatus, UserId, error::ValidationError, repositories::memory::MockEventRepository,
    };
    use chrono::{DateTime, Duration};

    fn service() -> EventService<MockEventRepository> {
        EventService::new(Arc::new(MockEventRepository::default()))
    }

    fn open_day() -> NewEvent {
        let start = DateTime::from_timestamp(1_750_000_000, 0).unwrap();
        NewEvent {
            title: "Open day".to_string(),
            description: Some("Tours for applicants".to_string()),
            start_date: start,
            end_date: start + Duration::hours(4),
            status: EventStatus::Planned,
            estimated_budget: Some(12_000),
            notes: None,
            created_by: UserId::new(3),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_event() {
        let service = service();

        let event = service.create_event(open_day()).await.unwrap();
        assert_eq!(event.title, "Open day");
        assert_eq!(event.created_by, Some(UserId::new(3)));
        assert_eq!(event.status, EventStatus::Planned);

        assert_eq!(service.get_event(&event.id).await.unwrap(), Some(event));
        assert_eq!(service.get_event(&EventId::new(99)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_event_normalizes_text() {
        let service = service();

        let event = service
            .create_event(NewEvent {
                title: "  Science fair ".to_string(),
                description: Some("   ".to_string()),
                notes: Some(" bring badges ".to_string()),
                ..open_day()
            })
            .await
            .unwrap();

        assert_eq!(event.title, "Science fair");
        assert_eq!(event.description, None);
        assert_eq!(event.notes.as_deref(), Some("bring badges"));
    }

    #[tokio::test]
    async fn test_invalid_event_is_not_stored() {
        let service = service();

        let result = service
            .create_event(NewEvent {
                end_date: open_day().start_date - Duration::days(1),
                ..open_day()
            })
            .await;

        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidField(_)))
        ));
        assert!(service.list_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_title() {
        let service = service();
        service.create_event(open_day()).await.unwrap();
        service.create_event(open_day()).await.unwrap();
        service
            .create_event(NewEvent {
                title: "Graduation".to_string(),
                ..open_day()
            })
            .await
            .unwrap();

        assert_eq!(service.find_by_title(" Open day ").await.unwrap().len(), 2);
        assert!(service.find_by_title("open day").await.unwrap().is_empty());

        let all: Vec<String> = service
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(all, vec!["Open day", "Open day", "Graduation"]);
    }
}
