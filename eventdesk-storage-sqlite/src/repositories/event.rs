use crate::SqliteEvent;
use async_trait::async_trait;
use chrono::Utc;
use eventdesk_core::{
    Error, Event, EventId, NewEvent, error::StorageError, repositories::EventRepository,
};
use sqlx::SqlitePool;

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> Error {
    Error::Storage(StorageError::Database(e.to_string()))
}

fn into_events(rows: Vec<SqliteEvent>) -> Result<Vec<Event>, Error> {
    Ok(rows
        .into_iter()
        .map(Event::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, event: NewEvent) -> Result<Event, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteEvent>(
            r#"
            INSERT INTO events (
                title, description, start_date, end_date, status,
                estimated_budget, notes, created_by, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING *
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_date.timestamp())
        .bind(event.end_date.timestamp())
        .bind(event.status.as_str())
        .bind(event.estimated_budget)
        .bind(&event.notes)
        .bind(event.created_by.as_i64())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to insert event");
            database_error(e)
        })?;

        Ok(Event::try_from(row)?)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, Error> {
        let row = sqlx::query_as::<_, SqliteEvent>("SELECT * FROM events WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(row.map(Event::try_from).transpose()?)
    }

    async fn find_by_title(&self, title: &str) -> Result<Vec<Event>, Error> {
        let rows =
            sqlx::query_as::<_, SqliteEvent>("SELECT * FROM events WHERE title = ?1 ORDER BY id")
                .bind(title)
                .fetch_all(&self.pool)
                .await
                .map_err(database_error)?;

        into_events(rows)
    }

    async fn list(&self) -> Result<Vec<Event>, Error> {
        let rows = sqlx::query_as::<_, SqliteEvent>("SELECT * FROM events ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        into_events(rows)
    }
}
