use axum::{
    Extension, RequestPartsExt,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use eventdesk::{SessionToken, User};

use crate::{error::AuthError, types::CookieConfig};

/// Session tokens carried by the request, `Authorization: Bearer` first and
/// the session cookie second.
///
/// Both are returned so a stale bearer header does not hide a valid cookie.
pub(crate) fn session_tokens(
    headers: &HeaderMap,
    jar: &CookieJar,
    cookie_name: &str,
) -> Vec<SessionToken> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let cookie = jar
        .get(cookie_name)
        .map(|cookie| cookie.value())
        .filter(|token| !token.is_empty());

    bearer
        .into_iter()
        .chain(cookie)
        .map(SessionToken::new)
        .collect()
}

/// The authenticated user; rejects with 401 when the request carries no
/// valid session.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(user): Extension<User> =
            parts.extract().await.map_err(|_| AuthError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}

/// An authenticated administrator; 401 without a session, 403 for other roles.
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, "Non-admin attempted an admin operation");
            return Err(AuthError::Forbidden);
        }

        Ok(AdminUser(user))
    }
}

/// The raw session token of the request, if any, without validating it.
pub struct SessionTokenFromRequest(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for SessionTokenFromRequest
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookie_name = parts
            .extensions
            .get::<CookieConfig>()
            .map(|config| config.name.clone())
            .unwrap_or_else(|| CookieConfig::default().name);

        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid cookie header"))?;

        Ok(SessionTokenFromRequest(
            session_tokens(&parts.headers, &jar, &cookie_name)
                .into_iter()
                .next(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_bearer_comes_before_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        let jar = CookieJar::new().add(Cookie::new("access_token", "from-cookie"));

        let tokens = session_tokens(&headers, &jar, "access_token");
        let tokens: Vec<&str> = tokens.iter().map(SessionToken::as_str).collect();
        assert_eq!(tokens, vec!["from-header", "from-cookie"]);
    }

    #[test]
    fn test_cookie_fallback() {
        let headers = HeaderMap::new();
        let jar = CookieJar::new().add(Cookie::new("access_token", "from-cookie"));

        let tokens = session_tokens(&headers, &jar, "access_token");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].as_str(), "from-cookie");
        assert!(session_tokens(&headers, &jar, "other_cookie").is_empty());
    }

    #[test]
    fn test_empty_or_non_bearer_header_is_ignored() {
        let jar = CookieJar::new();

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(session_tokens(&headers, &jar, "access_token").is_empty());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(session_tokens(&headers, &jar, "access_token").is_empty());
    }
}
