use crate::SqliteUser;
use async_trait::async_trait;
use chrono::Utc;
use eventdesk_core::{
    CredentialRecord, Error, NewUser, Role, User, UserId,
    error::{AuthError, StorageError},
    repositories::UserRepository,
};
use sqlx::SqlitePool;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> Error {
    Error::Storage(StorageError::Database(e.to_string()))
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteUser>(
            r#"
            INSERT INTO users (username, salt, password_hash, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.salt)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                Error::Auth(AuthError::UserAlreadyExists)
            } else {
                tracing::error!(error = %e, "Failed to insert user");
                database_error(e)
            }
        })?;

        Ok(User::try_from(row)?)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>("SELECT * FROM users WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(row.map(CredentialRecord::try_from).transpose()?)
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        let rows = sqlx::query_as::<_, SqliteUser>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<User, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(
            r#"
            UPDATE users
            SET role = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(role.as_str())
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .ok_or(AuthError::UserNotFound)?;

        Ok(User::try_from(row)?)
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound.into());
        }
        Ok(())
    }
}
