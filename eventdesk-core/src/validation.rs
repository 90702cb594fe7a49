use crate::{error::ValidationError, event::NewEvent};
use regex::Regex;
use std::sync::LazyLock;

/// Username and password rules shared by registration, login and admin bootstrap.
///
/// Usernames are case-insensitive: every entry point runs them through
/// [`normalize_username`] before touching storage.
static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}_.@-]+$").expect("Invalid username regex pattern")
});

const USERNAME_MAX_CHARS: usize = 64;
const PASSWORD_MAX_BYTES: usize = 128;
const EVENT_TITLE_MAX_CHARS: usize = 200;

/// Trims and lowercases a username, then checks it.
///
/// # Examples
///
/// ```rust
/// use eventdesk_core::validation::normalize_username;
///
/// assert_eq!(normalize_username("  Alice ").unwrap(), "alice");
/// assert!(normalize_username("bad name").is_err());
/// ```
pub fn normalize_username(username: &str) -> Result<String, ValidationError> {
    let normalized = username.trim().to_lowercase();
    validate_username(&normalized)?;
    Ok(normalized)
}

/// Validates an already normalized username
///
/// # Username Requirements
///
/// - Cannot be empty
/// - Maximum 64 characters
/// - Letters, digits, `_`, `.`, `@` and `-` only
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::MissingField(
            "Username is required".to_string(),
        ));
    }

    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be no more than {USERNAME_MAX_CHARS} characters long"
        )));
    }

    if USERNAME_REGEX.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername(
            "Username may only contain letters, digits, '_', '.', '@' and '-'".to_string(),
        ))
    }
}

/// Validates a password before it is hashed
///
/// # Password Requirements
///
/// - Cannot be empty or whitespace only
/// - Maximum 128 bytes
///
/// # Examples
///
/// ```rust
/// use eventdesk_core::validation::validate_password;
///
/// assert!(validate_password("correct-horse").is_ok());
/// assert!(validate_password("   ").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    if password.trim().is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password cannot be only whitespace".to_string(),
        ));
    }

    if password.len() > PASSWORD_MAX_BYTES {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be no more than {PASSWORD_MAX_BYTES} bytes long"
        )));
    }

    Ok(())
}

/// Validates an event before it is stored
///
/// # Event Requirements
///
/// - Title cannot be empty and is at most 200 characters
/// - The end date cannot precede the start date
/// - The estimated budget cannot be negative
pub fn validate_event(event: &NewEvent) -> Result<(), ValidationError> {
    if event.title.trim().is_empty() {
        return Err(ValidationError::MissingField(
            "Event title is required".to_string(),
        ));
    }

    if event.title.chars().count() > EVENT_TITLE_MAX_CHARS {
        return Err(ValidationError::InvalidField(format!(
            "Event title must be no more than {EVENT_TITLE_MAX_CHARS} characters long"
        )));
    }

    if event.end_date < event.start_date {
        return Err(ValidationError::InvalidField(
            "Event cannot end before it starts".to_string(),
        ));
    }

    if event.estimated_budget.is_some_and(|budget| budget < 0) {
        return Err(ValidationError::InvalidField(
            "Estimated budget cannot be negative".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("Alice").unwrap(), "alice");
        assert_eq!(normalize_username("  BOB.smith ").unwrap(), "bob.smith");
        assert_eq!(normalize_username("Иван_Петров").unwrap(), "иван_петров");
        assert_eq!(normalize_username("ops@example.org").unwrap(), "ops@example.org");
    }

    #[test]
    fn test_username_case_variants_collapse() {
        assert_eq!(
            normalize_username("Admin").unwrap(),
            normalize_username("aDMIN").unwrap()
        );
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(matches!(
            normalize_username(""),
            Err(ValidationError::MissingField(_))
        ));
        assert!(matches!(
            normalize_username("   "),
            Err(ValidationError::MissingField(_))
        ));
        assert!(normalize_username("two words").is_err());
        assert!(normalize_username("quote'").is_err());
        assert!(normalize_username("semi;colon").is_err());
        assert!(normalize_username(&"a".repeat(65)).is_err());
        assert!(normalize_username(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("correct-horse").is_ok());
        assert!(validate_password("x").is_ok());
        assert!(validate_password(&"a".repeat(128)).is_ok());

        assert!(matches!(
            validate_password(""),
            Err(ValidationError::MissingField(_))
        ));
        assert!(matches!(
            validate_password(" \t "),
            Err(ValidationError::InvalidPassword(_))
        ));
        assert!(matches!(
            validate_password(&"a".repeat(129)),
            Err(ValidationError::InvalidPassword(_))
        ));
    }

    fn event(title: &str) -> NewEvent {
        let start = chrono::DateTime::from_timestamp(1_750_000_000, 0).unwrap();
        NewEvent {
            title: title.to_string(),
            description: None,
            start_date: start,
            end_date: start + chrono::Duration::hours(2),
            status: crate::event::EventStatus::Planned,
            estimated_budget: Some(5_000),
            notes: None,
            created_by: crate::UserId::new(1),
        }
    }

    #[test]
    fn test_validate_event() {
        assert!(validate_event(&event("Open day")).is_ok());

        let same_instant = NewEvent {
            end_date: event("Open day").start_date,
            ..event("Open day")
        };
        assert!(validate_event(&same_instant).is_ok());

        assert!(matches!(
            validate_event(&event("  ")),
            Err(ValidationError::MissingField(_))
        ));
        assert!(validate_event(&event(&"t".repeat(201))).is_err());

        let backwards = NewEvent {
            end_date: event("Open day").start_date - chrono::Duration::minutes(1),
            ..event("Open day")
        };
        assert!(matches!(
            validate_event(&backwards),
            Err(ValidationError::InvalidField(_))
        ));

        let negative = NewEvent {
            estimated_budget: Some(-1),
            ..event("Open day")
        };
        assert!(validate_event(&negative).is_err());
    }
}
