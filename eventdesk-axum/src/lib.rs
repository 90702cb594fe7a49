//! # EventDesk Axum Integration
//!
//! Axum routes and middleware for EventDesk: registration, login, logout, the
//! current user, the admin user-management endpoints and the event routes.
//!
//! Clients present their session token either as `Authorization: Bearer` or
//! through the session cookie set at login.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use eventdesk::{EventDesk, JwtConfig, TokenIssuer};
//! use eventdesk_axum::{event_routes, routes, CookieConfig};
//! use eventdesk_storage_sqlite::SqliteRepositoryProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repositories = Arc::new(SqliteRepositoryProvider::connect("sqlite::memory:").await?);
//!     let issuer = TokenIssuer::new(
//!         JwtConfig::new_hs256(b"change-me-to-a-long-random-secret")?,
//!         chrono::Duration::minutes(15),
//!     )?;
//!     let desk = Arc::new(EventDesk::new(repositories, issuer));
//!     desk.migrate().await?;
//!
//!     let app = Router::new()
//!         .nest(
//!             "/event",
//!             event_routes(desk.clone())
//!                 .with_cookie_config(CookieConfig::development())
//!                 .build(),
//!         )
//!         .nest(
//!             "/user",
//!             routes(desk).with_cookie_config(CookieConfig::development()).build(),
//!         );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;

pub use error::{AuthError, Result};
pub use extractors::{AdminUser, AuthUser, SessionTokenFromRequest};
pub use middleware::{AuthState, auth_middleware, require_auth};
pub use routes::{create_event_router, create_router};
pub use types::{
    ChangeRoleRequest, CookieConfig, CookieSameSite, CreateEventRequest, EventResponse,
    EventsResponse, HealthResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, UserResponse, UsersResponse,
};

use axum::Router;
use eventdesk::EventDesk;
use eventdesk_core::RepositoryProvider;
use std::sync::Arc;

/// Create the account routes for your Axum application.
///
/// The returned builder produces a [`Router`] meant to be nested, usually at
/// `/user`.
pub fn routes<R>(desk: Arc<EventDesk<R>>) -> AuthRouterBuilder<R>
where
    R: RepositoryProvider + 'static,
{
    AuthRouterBuilder {
        desk,
        cookie_config: CookieConfig::default(),
    }
}

/// Builder for configuring the account routes
pub struct AuthRouterBuilder<R: RepositoryProvider> {
    desk: Arc<EventDesk<R>>,
    cookie_config: CookieConfig,
}

impl<R: RepositoryProvider + 'static> AuthRouterBuilder<R> {
    /// Set custom cookie configuration
    pub fn with_cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        create_router(self.desk, self.cookie_config)
    }
}

impl<R: RepositoryProvider + 'static> From<AuthRouterBuilder<R>> for Router {
    fn from(builder: AuthRouterBuilder<R>) -> Self {
        builder.build()
    }
}

/// Create the event routes, usually nested at `/event`.
///
/// The session cookie configuration must match the one given to [`routes`]
/// so a cookie set at login is recognised here.
pub fn event_routes<R>(desk: Arc<EventDesk<R>>) -> EventRouterBuilder<R>
where
    R: RepositoryProvider + 'static,
{
    EventRouterBuilder {
        desk,
        cookie_config: CookieConfig::default(),
    }
}

/// Builder for configuring the event routes
pub struct EventRouterBuilder<R: RepositoryProvider> {
    desk: Arc<EventDesk<R>>,
    cookie_config: CookieConfig,
}

impl<R: RepositoryProvider + 'static> EventRouterBuilder<R> {
    pub fn with_cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    pub fn build(self) -> Router {
        create_event_router(self.desk, self.cookie_config)
    }
}

impl<R: RepositoryProvider + 'static> From<EventRouterBuilder<R>> for Router {
    fn from(builder: EventRouterBuilder<R>) -> Self {
        builder.build()
    }
}
