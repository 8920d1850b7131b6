//! Repository implementations for data access.
//!
//! Repositories implement the core traits, hiding the `SeaORM`
//! implementation details from the rest of the application.

pub mod attachment;
pub mod book;
pub mod email_verification;
pub mod user;

pub use attachment::AttachmentRepository;
pub use book::BookRepository;
pub use email_verification::EmailVerificationRepository;
pub use user::UserRepository;
