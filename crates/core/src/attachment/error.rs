//! Attachment error types.

use bookcrossing_shared::AppError;
use thiserror::Error;

/// Attachment operation errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Book is missing or owned by someone else.
    #[error("Книга не найдена")]
    BookNotFound(i32),

    /// Book has no attachment.
    #[error("Вложение не найдено")]
    NotFound(i32),

    /// Upload arrived without a file name.
    #[error("Имя не должно быть пустым")]
    EmptyName,

    /// Content type is not an image.
    #[error("Недопустимый формат файла")]
    InvalidFormat(Option<String>),

    /// File exceeds the configured limit.
    #[error("Размер файла превышает допустимый")]
    TooLarge {
        /// Actual file size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AttachmentError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl std::fmt::Display) -> Self {
        Self::Repository(msg.to_string())
    }
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        let message = err.to_string();
        match err {
            AttachmentError::BookNotFound(_) => AppError::not_found("book", message),
            AttachmentError::NotFound(_) => AppError::not_found("attachment", message),
            AttachmentError::EmptyName
            | AttachmentError::InvalidFormat(_)
            | AttachmentError::TooLarge { .. } => AppError::BadRequest(message),
            AttachmentError::Repository(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AttachmentError::BookNotFound(1), 404)]
    #[case(AttachmentError::NotFound(1), 404)]
    #[case(AttachmentError::EmptyName, 400)]
    #[case(AttachmentError::InvalidFormat(None), 400)]
    #[case(AttachmentError::TooLarge { size: 2, max: 1 }, 400)]
    #[case(AttachmentError::repository("down"), 500)]
    fn test_status_codes(#[case] err: AttachmentError, #[case] status: u16) {
        assert_eq!(AppError::from(err).status_code(), status);
    }

    #[test]
    fn test_not_found_entities() {
        assert!(matches!(
            AppError::from(AttachmentError::NotFound(7)),
            AppError::NotFound { entity: "attachment", .. }
        ));
        assert!(matches!(
            AppError::from(AttachmentError::BookNotFound(7)),
            AppError::NotFound { entity: "book", .. }
        ));
    }
}
