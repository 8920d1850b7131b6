//! Book error types.

use bookcrossing_shared::AppError;
use thiserror::Error;

/// Book operation errors.
#[derive(Debug, Error)]
pub enum BookError {
    /// Book does not exist or belongs to someone else.
    #[error("Книга не найдена")]
    NotFound(i32),

    /// Owner login does not resolve to a user.
    #[error("Пользователь не найден")]
    OwnerNotFound(String),

    /// Input failed field validation.
    #[error("invalid book: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl BookError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl std::fmt::Display) -> Self {
        Self::Repository(msg.to_string())
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        let message = err.to_string();
        match err {
            BookError::NotFound(_) => AppError::not_found("book", message),
            BookError::OwnerNotFound(_) => AppError::not_found("user", message),
            BookError::Validation(messages) => AppError::Validation(messages),
            BookError::Repository(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_app_error() {
        let err: AppError = BookError::NotFound(1).into();
        assert_eq!(err.status_code(), 404);
        assert!(matches!(
            err,
            AppError::NotFound { entity: "book", ref message } if message == "Книга не найдена"
        ));

        let err: AppError = BookError::Validation(vec!["title: x".into()]).into();
        assert_eq!(err.status_code(), 400);

        let err: AppError = BookError::repository("boom").into();
        assert_eq!(err.status_code(), 500);
    }
}
