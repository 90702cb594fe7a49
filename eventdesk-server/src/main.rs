use std::sync::Arc;

use axum::Router;
use eventdesk::{EventDesk, JwtConfig, SqliteRepositoryProvider, TokenIssuer};
use eventdesk_axum::CookieConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "eventdesk-server starting");

    // Salts come from the OS generator; refuse to start without it
    eventdesk_core::crypto::ensure_entropy()?;

    let config = Config::load()?;
    info!(?config, "Loaded configuration");

    let repositories = Arc::new(SqliteRepositoryProvider::connect(&config.server.database_url).await?);
    let issuer = TokenIssuer::new(
        JwtConfig::new_hs256(config.auth.jwt_secret.as_bytes())?
            .with_issuer(config.auth.jwt_issuer.clone()),
        config.token_ttl(),
    )?;

    let desk = Arc::new(EventDesk::new(repositories, issuer));
    desk.migrate().await?;
    info!("Database ready at: {}", config.server.database_url);

    if let Some(admin) = &config.admin {
        let user = desk.ensure_admin(&admin.username, &admin.password).await?;
        info!(user_id = %user.id, "Administrator account ready");
    }

    let cookie_config = CookieConfig {
        secure: config.server.cookie_secure,
        ..CookieConfig::new(config.server.cookie_name.clone())
    };

    let app = Router::new()
        .nest(
            "/event",
            eventdesk_axum::event_routes(desk.clone())
                .with_cookie_config(cookie_config.clone())
                .build(),
        )
        .nest(
            "/user",
            eventdesk_axum::routes(desk)
                .with_cookie_config(cookie_config)
                .build(),
        );

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
