//! SQLite storage backend for eventdesk accounts and events
//!
//! ```rust,no_run
//! use eventdesk_core::RepositoryProvider;
//! use eventdesk_storage_sqlite::SqliteRepositoryProvider;
//!
//! # async fn run() -> Result<(), eventdesk_core::Error> {
//! let provider = SqliteRepositoryProvider::connect("sqlite://eventdesk.db?mode=rwc").await?;
//! provider.migrate().await?;
//! # Ok(())
//! # }
//! ```

pub mod migrations;
pub mod repositories;

use chrono::{DateTime, Utc};
use eventdesk_core::{
    CredentialRecord, Event, EventId, EventStatus, Role, User, UserId, error::StorageError,
};

pub use repositories::{SqliteEventRepository, SqliteRepositoryProvider, SqliteUserRepository};

/// Row of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteUser {
    pub id: i64,
    pub username: String,
    pub salt: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| StorageError::Corrupt(format!("timestamp out of range: {seconds}")))
}

impl TryFrom<SqliteUser> for CredentialRecord {
    type Error = StorageError;

    fn try_from(row: SqliteUser) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|_| {
            StorageError::Corrupt(format!("user {} has unknown role {:?}", row.id, row.role))
        })?;

        Ok(CredentialRecord {
            user: User {
                id: UserId::new(row.id),
                username: row.username,
                role,
                created_at: timestamp(row.created_at)?,
                updated_at: timestamp(row.updated_at)?,
            },
            salt: row.salt,
            password_hash: row.password_hash,
        })
    }
}

impl TryFrom<SqliteUser> for User {
    type Error = StorageError;

    fn try_from(row: SqliteUser) -> Result<Self, Self::Error> {
        CredentialRecord::try_from(row).map(|record| record.user)
    }
}

/// Row of the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteEvent {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: i64,
    pub end_date: i64,
    pub status: String,
    pub estimated_budget: Option<i64>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<SqliteEvent> for Event {
    type Error = StorageError;

    fn try_from(row: SqliteEvent) -> Result<Self, Self::Error> {
        let status = row.status.parse::<EventStatus>().map_err(|_| {
            StorageError::Corrupt(format!(
                "event {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;

        Ok(Event {
            id: EventId::new(row.id),
            title: row.title,
            description: row.description,
            start_date: timestamp(row.start_date)?,
            end_date: timestamp(row.end_date)?,
            status,
            estimated_budget: row.estimated_budget,
            notes: row.notes,
            created_by: row.created_by.map(UserId::new),
            created_at: timestamp(row.created_at)?,
            updated_at: timestamp(row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> SqliteUser {
        SqliteUser {
            id: 4,
            username: "alice".to_string(),
            salt: "AbCdEfGh12345678".to_string(),
            password_hash: "ab".repeat(32),
            role: role.to_string(),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_100,
        }
    }

    #[test]
    fn test_row_conversion() {
        let record = CredentialRecord::try_from(row("admin")).unwrap();

        assert_eq!(record.user.id, UserId::new(4));
        assert_eq!(record.user.role, Role::Admin);
        assert_eq!(record.user.created_at.timestamp(), 1_700_000_000);
        assert_eq!(record.salt, "AbCdEfGh12345678");
    }

    #[test]
    fn test_unknown_role_is_corrupt() {
        assert!(matches!(
            User::try_from(row("superuser")),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_event_row_conversion() {
        let event = Event::try_from(SqliteEvent {
            id: 2,
            title: "Open day".to_string(),
            description: None,
            start_date: 1_750_000_000,
            end_date: 1_750_014_400,
            status: "in progress".to_string(),
            estimated_budget: Some(12_000),
            notes: None,
            created_by: None,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        })
        .unwrap();

        assert_eq!(event.id, EventId::new(2));
        assert_eq!(event.status, EventStatus::InProgress);
        assert_eq!(event.end_date.timestamp(), 1_750_014_400);
        assert_eq!(event.created_by, None);
    }
}
