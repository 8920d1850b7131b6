//! User accounts.
//!
//! Accounts are created disabled and become usable once the e-mail
//! confirmation link is followed.

mod error;
mod service;
mod types;

pub use error::UserError;
pub use service::{UserRepository, UserService};
pub use types::{NewUser, Registered, RegistrationInput, User};
