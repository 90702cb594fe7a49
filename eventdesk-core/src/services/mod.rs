//! Service layer for business logic
//!
//! These services wrap a repository with the rules of the system:
//! normalization, hashing, token issuance and event validation.

pub mod event;
pub mod password;
pub mod session;
pub mod user;

pub use event::EventService;
pub use password::PasswordService;
pub use session::SessionService;
pub use user::UserService;
