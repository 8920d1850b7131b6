//! Password hashing for user accounts.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
