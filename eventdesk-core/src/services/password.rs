use crate::{
    Error, NewUser, Role, User,
    crypto::{self, PasswordHash},
    error::{AuthError, CryptoError},
    repositories::UserRepository,
    validation::{normalize_username, validate_password},
};
use std::sync::Arc;

/// Stand-in credential checked when a username is unknown, so a miss costs
/// one full key derivation just like a wrong password.
const DUMMY_SALT: &str = "0000000000000000";
const DUMMY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Service for password registration and authentication
pub struct PasswordService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> PasswordService<R> {
    /// Create a new PasswordService with the given repository
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Register a new user with the default role
    pub async fn register(&self, username: &str, password: &str) -> Result<User, Error> {
        self.register_with_role(username, password, Role::default())
            .await
    }

    /// Register a new user with an explicit role
    ///
    /// The username is normalized first. A username that is already taken
    /// yields [`AuthError::UserAlreadyExists`] and nothing is written.
    pub async fn register_with_role(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, Error> {
        let username = normalize_username(username)?;
        validate_password(password)?;

        if self
            .repository
            .find_credentials_by_username(&username)
            .await?
            .is_some()
        {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let PasswordHash { salt, hash } = Self::hash_password(password).await?;

        // Storage enforces uniqueness as well, so a concurrent registration
        // of the same name still ends in UserAlreadyExists.
        let user = self
            .repository
            .create(NewUser {
                username,
                salt,
                password_hash: hash,
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
        Ok(user)
    }

    /// Authenticate a user with username and password
    ///
    /// An unknown or malformed username, an empty or wrong password and a
    /// corrupt stored record all produce [`AuthError::InvalidCredentials`],
    /// and each costs one key derivation.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, Error> {
        let record = match normalize_username(username) {
            Ok(username) if !password.is_empty() => {
                self.repository
                    .find_credentials_by_username(&username)
                    .await?
            }
            _ => None,
        };

        let (salt, hash, user) = match record {
            Some(record) if record.is_complete() => {
                (record.salt, record.password_hash, Some(record.user))
            }
            Some(record) => {
                tracing::warn!(user_id = %record.user.id, "Stored credential is incomplete");
                (DUMMY_SALT.to_string(), DUMMY_HASH.to_string(), None)
            }
            None => (DUMMY_SALT.to_string(), DUMMY_HASH.to_string(), None),
        };

        let verified = Self::verify_password(password, salt, hash).await?;

        match user {
            Some(user) if verified => {
                tracing::debug!(user_id = %user.id, "Password verified");
                Ok(user)
            }
            _ => Err(AuthError::InvalidCredentials.into()),
        }
    }

    /// Hash a password on the blocking pool
    async fn hash_password(password: &str) -> Result<PasswordHash, Error> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || crypto::hash_password(&password))
            .await
            .map_err(|e| CryptoError::PasswordHash(e.to_string()))?
    }

    /// Verify a password on the blocking pool
    async fn verify_password(password: &str, salt: String, hash: String) -> Result<bool, Error> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || crypto::verify_password(&password, &salt, &hash))
            .await
            .map_err(|e| CryptoError::PasswordHash(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ValidationError, repositories::memory::MockUserRepository};

    fn service() -> (Arc<MockUserRepository>, PasswordService<MockUserRepository>) {
        let repository = Arc::new(MockUserRepository::default());
        (repository.clone(), PasswordService::new(repository))
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let (_, service) = service();

        let user = service.register("Alice", "s3cret").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);

        let authenticated = service.authenticate("alice", "s3cret").await.unwrap();
        assert_eq!(authenticated.id, user.id);
    }

    #[tokio::test]
    async fn test_username_is_case_insensitive() {
        let (_, service) = service();
        service.register("alice", "s3cret").await.unwrap();

        assert!(service.authenticate("  ALICE ", "s3cret").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_stores_salt_and_hash() {
        let (repository, service) = service();
        service.register("alice", "s3cret").await.unwrap();

        let record = repository
            .find_credentials_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.salt.len(), crypto::SALT_LENGTH);
        assert_eq!(record.password_hash.len(), crypto::HASH_LENGTH * 2);
        assert_eq!(
            record.password_hash,
            crypto::hash_password_with_salt("s3cret", &record.salt)
        );
    }

    #[tokio::test]
    async fn test_same_password_gets_distinct_salts() {
        let (repository, service) = service();
        service.register("alice", "shared").await.unwrap();
        service.register("bob", "shared").await.unwrap();

        let alice = repository
            .find_credentials_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        let bob = repository
            .find_credentials_by_username("bob")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(alice.salt, bob.salt);
        assert_ne!(alice.password_hash, bob.password_hash);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let (_, service) = service();
        service.register("alice", "first").await.unwrap();

        let result = service.register("ALICE", "second").await;
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::UserAlreadyExists))
        ));

        // The original password still works
        assert!(service.authenticate("alice", "first").await.is_ok());
        assert!(service.authenticate("alice", "second").await.is_err());
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (_, service) = service();

        assert!(matches!(
            service.register("", "pw").await,
            Err(Error::Validation(ValidationError::MissingField(_)))
        ));
        assert!(matches!(
            service.register("bad name", "pw").await,
            Err(Error::Validation(ValidationError::InvalidUsername(_)))
        ));
        assert!(matches!(
            service.register("alice", "").await,
            Err(Error::Validation(ValidationError::MissingField(_)))
        ));
        assert!(matches!(
            service.register("alice", "   ").await,
            Err(Error::Validation(ValidationError::InvalidPassword(_)))
        ));
    }

    #[tokio::test]
    async fn test_register_with_admin_role() {
        let (_, service) = service();

        let admin = service
            .register_with_role("root", "s3cret", Role::Admin)
            .await
            .unwrap();
        assert!(admin.is_admin());
    }

    #[tokio::test]
    async fn test_authentication_failures_are_uniform() {
        let (_, service) = service();
        service.register("alice", "s3cret").await.unwrap();

        for (username, password) in [
            ("alice", "wrong"),
            ("nobody", "s3cret"),
            ("alice", ""),
            ("bad name", "s3cret"),
            ("", ""),
        ] {
            assert!(
                matches!(
                    service.authenticate(username, password).await,
                    Err(Error::Auth(AuthError::InvalidCredentials))
                ),
                "{username:?}/{password:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_login_input_still_derives() {
        let (_, service) = service();

        let start = std::time::Instant::now();
        let _ = service.authenticate("nobody", "s3cret").await;
        let unknown_user = start.elapsed();

        for (username, password) in [("bad name!", "s3cret"), ("alice", "")] {
            let start = std::time::Instant::now();
            let result = service.authenticate(username, password).await;
            let elapsed = start.elapsed();

            assert!(matches!(
                result,
                Err(Error::Auth(AuthError::InvalidCredentials))
            ));
            assert!(
                elapsed * 4 >= unknown_user,
                "{username:?}/{password:?} returned in {elapsed:?}, a miss takes {unknown_user:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_corrupt_record_never_verifies() {
        let (repository, service) = service();
        let user = service.register("alice", "s3cret").await.unwrap();

        repository.corrupt(&user.id, "", "").await;
        assert!(matches!(
            service.authenticate("alice", "s3cret").await,
            Err(Error::Auth(AuthError::InvalidCredentials))
        ));

        repository.corrupt(&user.id, "AbCdEfGh12345678", "not-hex").await;
        assert!(matches!(
            service.authenticate("alice", "s3cret").await,
            Err(Error::Auth(AuthError::InvalidCredentials))
        ));
    }
}
