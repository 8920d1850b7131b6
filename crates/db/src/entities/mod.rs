//! `SeaORM` entity definitions.

pub mod attachments;
pub mod books;
pub mod email_verification_tokens;
pub mod users;

pub mod prelude {
    //! Entity re-exports.

    pub use super::attachments::Entity as Attachments;
    pub use super::books::Entity as Books;
    pub use super::email_verification_tokens::Entity as EmailVerificationTokens;
    pub use super::users::Entity as Users;
}
