//! Attachment service implementation.

use std::sync::Arc;

use super::error::AttachmentError;
use super::types::{AttachmentFile, AttachmentInfo, AttachmentUpload, NewAttachment, is_image_content_type};
use crate::book::Book;

/// Repository trait for attachment persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait AttachmentRepository: Send + Sync {
    /// Find a book owned by `login`.
    fn find_owned_book(
        &self,
        book_id: i32,
        login: &str,
    ) -> impl std::future::Future<Output = Result<Option<Book>, AttachmentError>> + Send;

    /// Check if a book exists.
    fn book_exists(
        &self,
        book_id: i32,
    ) -> impl std::future::Future<Output = Result<bool, AttachmentError>> + Send;

    /// Insert the attachment or replace the one already stored for the book.
    fn upsert(
        &self,
        attachment: NewAttachment,
    ) -> impl std::future::Future<Output = Result<AttachmentInfo, AttachmentError>> + Send;

    /// Delete the attachment of a book.
    fn delete(
        &self,
        book_id: i32,
    ) -> impl std::future::Future<Output = Result<bool, AttachmentError>> + Send;

    /// Load the attachment of a book with its bytes.
    fn find_file(
        &self,
        book_id: i32,
    ) -> impl std::future::Future<Output = Result<Option<AttachmentFile>, AttachmentError>> + Send;
}

/// Checks the name and then the content type of an upload.
///
/// Returns the trimmed file name and the content type.
fn check_file_header(
    file_name: Option<String>,
    content_type: Option<String>,
) -> Result<(String, String), AttachmentError> {
    let file_name = file_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(AttachmentError::EmptyName)?;

    match content_type {
        Some(ct) if is_image_content_type(&ct) => Ok((file_name, ct)),
        other => Err(AttachmentError::InvalidFormat(other)),
    }
}

/// Attachment service for book cover images.
pub struct AttachmentService<R: AttachmentRepository> {
    repo: Arc<R>,
    max_size_bytes: usize,
}

impl<R: AttachmentRepository> AttachmentService<R> {
    /// Create a new attachment service accepting files up to `max_size_bytes`.
    #[must_use]
    pub fn new(repo: Arc<R>, max_size_bytes: usize) -> Self {
        Self {
            repo,
            max_size_bytes,
        }
    }

    /// Store the cover image of a book owned by `login`.
    ///
    /// Returns the book with the new attachment metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file name is missing or blank
    /// - The content type is not an image
    /// - The file exceeds the size limit
    /// - The book is absent or owned by someone else
    /// - Database operation fails
    pub async fn save_attachment(
        &self,
        upload: AttachmentUpload,
        login: &str,
    ) -> Result<Book, AttachmentError> {
        let (file_name, content_type) =
            check_file_header(upload.file_name, upload.content_type)?;

        if upload.data.len() > self.max_size_bytes {
            return Err(AttachmentError::TooLarge {
                size: upload.data.len(),
                max: self.max_size_bytes,
            });
        }

        let mut book = self
            .repo
            .find_owned_book(upload.book_id, login)
            .await?
            .ok_or(AttachmentError::BookNotFound(upload.book_id))?;

        let info = self
            .repo
            .upsert(NewAttachment {
                book_id: book.id,
                file_name,
                content_type,
                data: upload.data,
            })
            .await?;

        book.attachment = Some(info);
        Ok(book)
    }

    /// Remove the cover image of a book owned by `login`. The book stays.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` if the book is absent or not owned by `login`,
    /// and `NotFound` if it has no attachment.
    pub async fn delete_attachment(&self, book_id: i32, login: &str) -> Result<(), AttachmentError> {
        if self.repo.find_owned_book(book_id, login).await?.is_none() {
            return Err(AttachmentError::BookNotFound(book_id));
        }

        if self.repo.delete(book_id).await? {
            Ok(())
        } else {
            Err(AttachmentError::NotFound(book_id))
        }
    }

    /// Load a cover image for download.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` if there is no such book and `NotFound` if it
    /// has no attachment.
    pub async fn find_attachment(&self, book_id: i32) -> Result<AttachmentFile, AttachmentError> {
        if !self.repo.book_exists(book_id).await? {
            return Err(AttachmentError::BookNotFound(book_id));
        }

        self.repo
            .find_file(book_id)
            .await?
            .ok_or(AttachmentError::NotFound(book_id))
    }
}
