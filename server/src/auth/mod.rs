//! Identity for each request.
//!
//! A signed cookie carries `role:account-id`; the extractors in [`extract`]
//! resolve it against the store so handlers receive the account itself.

pub mod extract;
pub mod password;
pub mod session;

pub use extract::{CurrentOrganization, CurrentVolunteer, Identity};
pub use password::PasswordHasher;
pub use session::{SessionManager, SessionToken, SESSION_COOKIE};
