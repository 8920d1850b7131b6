//! User error types.

use bookcrossing_shared::AppError;
use thiserror::Error;

use crate::auth::PasswordError;

/// User operation errors.
#[derive(Debug, Error)]
pub enum UserError {
    /// Registration form failed validation.
    #[error("invalid registration: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Login is already registered.
    #[error("Пользователь с таким логином уже существует")]
    LoginTaken,

    /// E-mail is already registered.
    #[error("Пользователь с таким email уже существует")]
    EmailTaken,

    /// Confirmation token is unknown, expired or already used.
    #[error("Ссылка подтверждения недействительна")]
    InvalidConfirmationToken,

    /// Unknown login or wrong password.
    #[error("Некорректный логин или пароль")]
    InvalidCredentials,

    /// User has not confirmed the e-mail address yet.
    #[error("Учетная запись не подтверждена")]
    NotConfirmed,

    /// No user with this login.
    #[error("Пользователь не найден")]
    NotFound(String),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl UserError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl std::fmt::Display) -> Self {
        Self::Repository(msg.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::Validation(messages) => AppError::Validation(messages),
            UserError::LoginTaken | UserError::EmailTaken => AppError::Conflict(message),
            UserError::InvalidConfirmationToken => AppError::BadRequest(message),
            UserError::InvalidCredentials => AppError::Unauthorized(message),
            UserError::NotConfirmed => AppError::Forbidden(message),
            UserError::NotFound(_) => AppError::not_found("user", message),
            UserError::Password(_) => AppError::Internal(message),
            UserError::Repository(msg) => AppError::Database(msg),
        }
    }
}
