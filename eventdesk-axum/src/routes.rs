use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use eventdesk::{EventDesk, EventId, EventStatus, NewEvent, Role, SessionToken, UserId};
use eventdesk_core::RepositoryProvider;

use crate::{
    error::{AuthError, Result},
    extractors::{AdminUser, AuthUser},
    middleware::{AuthState, auth_middleware},
    types::*,
};

pub fn create_router<R>(desk: Arc<EventDesk<R>>, cookie_config: CookieConfig) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AuthState {
        desk,
        cookie_config: cookie_config.clone(),
    };

    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler));

    let user_routes = Router::new().route("/me", get(me_handler));

    let admin_routes = Router::new()
        .route("/get_users", get(list_users_handler))
        .route("/change_role", put(change_role_handler))
        .route("/delete_user/{id}", delete(delete_user_handler));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R>,
        ))
        .with_state(state)
        .layer(axum::Extension(cookie_config))
}

/// Routes for the office's events. Reads are public; creating an event
/// requires a signed-in user.
pub fn create_event_router<R>(desk: Arc<EventDesk<R>>, cookie_config: CookieConfig) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AuthState {
        desk,
        cookie_config: cookie_config.clone(),
    };

    Router::new()
        .route("/", get(list_events_handler))
        .route("/{id}", get(get_event_handler))
        .route("/name/{name}", get(events_by_title_handler))
        .route("/add_event", post(create_event_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R>,
        ))
        .with_state(state)
        .layer(axum::Extension(cookie_config))
}

fn same_site(config: &CookieConfig) -> SameSite {
    match config.same_site {
        CookieSameSite::Strict => SameSite::Strict,
        CookieSameSite::Lax => SameSite::Lax,
        CookieSameSite::None => SameSite::None,
    }
}

fn session_cookie(
    config: &CookieConfig,
    token: &SessionToken,
    max_age: chrono::Duration,
) -> Cookie<'static> {
    Cookie::build((config.name.clone(), token.to_string()))
        .path(config.path.clone())
        .http_only(config.http_only)
        .secure(config.secure)
        .same_site(same_site(config))
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

async fn health_handler<R>(State(state): State<AuthState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.desk.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn register_handler<R>(
    State(state): State<AuthState<R>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user = state
        .desk
        .register_user(&payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

async fn login_handler<R>(
    State(state): State<AuthState<R>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let (user, session) = state
        .desk
        .login_user(&payload.username, &payload.password)
        .await?;

    let cookie = session_cookie(
        &state.cookie_config,
        &session.token,
        session.expires_at - session.created_at,
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(LoginResponse {
            token: session.token,
            user,
            expires_at: session.expires_at,
        }),
    ))
}

/// Drop the client's copy of the token. Tokens are not revoked server-side.
async fn logout_handler<R>(
    State(state): State<AuthState<R>>,
    jar: CookieJar,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let jar = jar.remove(
        Cookie::build((state.cookie_config.name.clone(), ""))
            .path(state.cookie_config.path.clone())
            .build(),
    );

    Ok((
        jar,
        Json(MessageResponse {
            message: "Successfully logged out".to_string(),
        }),
    ))
}

async fn me_handler(AuthUser(user): AuthUser) -> Result<impl IntoResponse> {
    Ok(Json(UserResponse { user }))
}

async fn list_users_handler<R>(
    State(state): State<AuthState<R>>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let users = state.desk.list_users().await?;

    Ok(Json(UsersResponse { users }))
}

async fn change_role_handler<R>(
    State(state): State<AuthState<R>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<ChangeRoleRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let role = payload
        .new_role
        .parse::<Role>()
        .map_err(|e| AuthError::BadRequest(e.to_string()))?;

    let user = state.desk.change_role(&payload.id, role).await?;
    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        role = %role,
        "Role changed by admin"
    );

    Ok(Json(UserResponse { user }))
}

async fn delete_user_handler<R>(
    State(state): State<AuthState<R>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user_id = UserId::new(id);
    state.desk.delete_user(&user_id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %user_id, "User deleted by admin");

    Ok(Json(MessageResponse {
        message: format!("User {user_id} deleted"),
    }))
}

async fn list_events_handler<R>(State(state): State<AuthState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let events = state.desk.list_events().await?;

    Ok(Json(EventsResponse { events }))
}

async fn get_event_handler<R>(
    State(state): State<AuthState<R>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let event = state.desk.get_event(&EventId::new(id)).await?;

    Ok(Json(EventResponse { event }))
}

async fn events_by_title_handler<R>(
    State(state): State<AuthState<R>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let events = state.desk.find_events_by_title(&name).await?;

    Ok(Json(EventsResponse { events }))
}

async fn create_event_handler<R>(
    State(state): State<AuthState<R>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let status = match payload.status.as_deref() {
        Some(status) => status
            .parse::<EventStatus>()
            .map_err(|e| AuthError::BadRequest(e.to_string()))?,
        None => EventStatus::default(),
    };

    let event = state
        .desk
        .create_event(NewEvent {
            title: payload.title,
            description: payload.description,
            start_date: payload.start_date,
            end_date: payload.end_date,
            status,
            estimated_budget: payload.estimated_budget,
            notes: payload.notes,
            created_by: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(EventResponse { event })))
}
