use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use eventdesk::{EventDesk, EventDeskError, User};
use eventdesk_core::RepositoryProvider;

use crate::{error::AuthError, extractors::session_tokens, types::CookieConfig};

pub struct AuthState<R: RepositoryProvider> {
    pub desk: Arc<EventDesk<R>>,
    pub cookie_config: CookieConfig,
}

impl<R: RepositoryProvider> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            desk: self.desk.clone(),
            cookie_config: self.cookie_config.clone(),
        }
    }
}

/// Resolve the request's session tokens to a user.
///
/// A rejected token falls through to the next candidate. Storage failures are
/// reported instead of being treated as a missing session.
async fn resolve_user<R>(
    state: &AuthState<R>,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Result<Option<User>, AuthError>
where
    R: RepositoryProvider,
{
    for token in session_tokens(headers, jar, &state.cookie_config.name) {
        match state.desk.authenticate_session(&token).await {
            Ok(user) => return Ok(Some(user)),
            Err(EventDeskError::SessionRejected) => {
                tracing::debug!("Ignoring rejected session token");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve session");
                return Err(e.into());
            }
        }
    }

    Ok(None)
}

/// Resolve the request's session to a user and store it in the request
/// extensions. Requests without a valid session pass through unauthenticated.
///
/// The user is loaded from storage on every request, so role changes and
/// deletions apply to tokens that were already issued.
pub async fn auth_middleware<R>(
    State(state): State<AuthState<R>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: RepositoryProvider,
{
    if let Some(user) = resolve_user(&state, request.headers(), &jar).await? {
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

/// Reject requests that do not carry a valid session with 401.
pub async fn require_auth<R>(
    State(state): State<AuthState<R>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: RepositoryProvider,
{
    resolve_user(&state, request.headers(), &jar)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    Ok(next.run(request).await)
}
