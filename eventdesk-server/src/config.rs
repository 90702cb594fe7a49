use thiserror::Error;

const MIN_SECRET_BYTES: usize = 32;
const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub server: ServerConfig,
    /// Administrator created or promoted at startup, when both variables are set
    pub admin: Option<AdminConfig>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub database_url: String,
    pub cookie_name: String,
    /// Set the `Secure` cookie flag. Only disable for plain-HTTP local runs.
    pub cookie_secure: bool,
}

#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            database_url: "sqlite://eventdesk.db?mode=rwc".to_string(),
            cookie_name: "access_token".to_string(),
            cookie_secure: true,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_issuer", &self.auth.jwt_issuer)
            .field("token_ttl_seconds", &self.auth.token_ttl_seconds)
            .field("server", &self.server)
            .field(
                "admin_username",
                &self.admin.as_ref().map(|admin| &admin.username),
            )
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let jwt_secret = lookup("EVENTDESK_JWT_SECRET").unwrap_or_default();

        let jwt_issuer =
            lookup("EVENTDESK_JWT_ISSUER").unwrap_or_else(|| "eventdesk".to_string());

        let token_ttl_seconds = match lookup("EVENTDESK_TOKEN_TTL_SECONDS") {
            Some(value) => value.trim().parse::<i64>().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "EVENTDESK_TOKEN_TTL_SECONDS must be a whole number of seconds, got {value:?}"
                ))
            })?,
            None => 900,
        };

        let cookie_secure = lookup("EVENTDESK_COOKIE_SECURE")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0"))
            .unwrap_or(defaults.cookie_secure);

        let admin = match (
            lookup("EVENTDESK_ADMIN_USERNAME"),
            lookup("EVENTDESK_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(AdminConfig { username, password }),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "Only one of EVENTDESK_ADMIN_USERNAME and EVENTDESK_ADMIN_PASSWORD is set, \
                     skipping admin bootstrap"
                );
                None
            }
        };

        let config = Config {
            auth: AuthConfig {
                jwt_secret,
                jwt_issuer,
                token_ttl_seconds,
            },
            server: ServerConfig {
                bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
                database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
                cookie_name: lookup("EVENTDESK_COOKIE_NAME").unwrap_or(defaults.cookie_name),
                cookie_secure,
            },
            admin,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "EVENTDESK_JWT_SECRET must be set".to_string(),
            ));
        }

        if self.auth.jwt_secret.len() < MIN_SECRET_BYTES {
            tracing::warn!(
                "EVENTDESK_JWT_SECRET is shorter than {} bytes. Use a longer random secret.",
                MIN_SECRET_BYTES
            );
        }

        if self.auth.token_ttl_seconds <= 0 {
            return Err(ConfigError::ValidationError(
                "EVENTDESK_TOKEN_TTL_SECONDS must be greater than zero".to_string(),
            ));
        }

        if self.auth.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "EVENTDESK_TOKEN_TTL_SECONDS must be at most {MAX_TOKEN_TTL_SECONDS} (one year)"
            )));
        }

        if self.server.cookie_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "EVENTDESK_COOKIE_NAME cannot be empty".to_string(),
            ));
        }

        if !self.server.cookie_secure {
            tracing::warn!("Session cookies are issued without the Secure flag");
        }

        Ok(())
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.auth.token_ttl_seconds)
    }
}
