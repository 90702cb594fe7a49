//! Repository implementations for SQLite storage

pub mod event;
pub mod user;

pub use event::SqliteEventRepository;
pub use user::SqliteUserRepository;

use async_trait::async_trait;
use eventdesk_core::{Error, error::StorageError, repositories::RepositoryProvider};
use eventdesk_migration::MigrationManager;
use sqlx::SqlitePool;

use crate::migrations::{self, SqliteMigrationManager};

/// Repository provider implementation for SQLite
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: SqliteUserRepository,
    event: SqliteEventRepository,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let user = SqliteUserRepository::new(pool.clone());
        let event = SqliteEventRepository::new(pool.clone());
        Self { pool, user, event }
    }

    /// Open a pool for `database_url` and wrap it
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let pool = SqlitePool::connect(database_url).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            Error::Storage(StorageError::Connection(e.to_string()))
        })?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;
    type EventRepo = SqliteEventRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }

    fn event(&self) -> &Self::EventRepo {
        &self.event
    }

    async fn migrate(&self) -> Result<(), Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        manager.up(&migrations::all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_migrate_and_health_check() {
        let provider = SqliteRepositoryProvider::connect("sqlite::memory:")
            .await
            .unwrap();

        provider.migrate().await.unwrap();
        provider.migrate().await.unwrap();
        provider.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_to_bad_url_fails() {
        let result =
            SqliteRepositoryProvider::connect("sqlite:///nonexistent-directory/eventdesk.db").await;

        assert!(matches!(
            result,
            Err(Error::Storage(StorageError::Connection(_)))
        ));
    }
}
