use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventdesk::EventDeskError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Event not found")]
    EventNotFound,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Missing, forged, expired or malformed session token
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,
}

impl From<EventDeskError> for AuthError {
    fn from(err: EventDeskError) -> Self {
        match err {
            EventDeskError::InvalidCredentials => AuthError::InvalidCredentials,
            EventDeskError::UserAlreadyExists => AuthError::UsernameTaken,
            EventDeskError::UserNotFound => AuthError::UserNotFound,
            EventDeskError::EventNotFound => AuthError::EventNotFound,
            EventDeskError::SessionRejected => AuthError::Unauthorized,
            EventDeskError::ValidationError(msg) => AuthError::BadRequest(msg),
            EventDeskError::StorageError(msg) | EventDeskError::InternalError(msg) => {
                AuthError::InternalError(msg)
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AuthError::EventNotFound => (StatusCode::NOT_FOUND, "Event not found"),
            AuthError::UsernameTaken => (StatusCode::CONFLICT, "Username already taken"),
            AuthError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AuthError::InternalError(ref msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
        };

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
