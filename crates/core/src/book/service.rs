//! Book service implementation.

use std::sync::Arc;

use bookcrossing_shared::types::PageResponse;

use super::error::BookError;
use super::types::{Book, BookInput, BookQuery};
use crate::validation::validate_fields;

/// Repository trait for book persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait BookRepository: Send + Sync {
    /// Resolve a login to a user ID.
    fn find_user_id(
        &self,
        login: &str,
    ) -> impl std::future::Future<Output = Result<Option<i32>, BookError>> + Send;

    /// Insert a book owned by `owner_id`.
    fn create(
        &self,
        owner_id: i32,
        input: BookInput,
    ) -> impl std::future::Future<Output = Result<Book, BookError>> + Send;

    /// Find a book by ID.
    fn find_by_id(
        &self,
        id: i32,
    ) -> impl std::future::Future<Output = Result<Option<Book>, BookError>> + Send;

    /// List books owned by a user.
    fn list_by_owner(
        &self,
        owner_id: i32,
    ) -> impl std::future::Future<Output = Result<Vec<Book>, BookError>> + Send;

    /// List every book except those owned by `excluded_owner`.
    fn list_excluding_owner(
        &self,
        excluded_owner: Option<i32>,
    ) -> impl std::future::Future<Output = Result<Vec<Book>, BookError>> + Send;

    /// Return one page of books matching the query, plus the total match count.
    fn search(
        &self,
        query: &BookQuery,
    ) -> impl std::future::Future<Output = Result<(Vec<Book>, u64), BookError>> + Send;

    /// Delete a book together with its attachment.
    fn delete(&self, id: i32)
    -> impl std::future::Future<Output = Result<bool, BookError>> + Send;
}

/// Book service enforcing ownership rules.
pub struct BookService<R: BookRepository> {
    repo: Arc<R>,
}

impl<R: BookRepository> BookService<R> {
    /// Create a new book service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Validate and store a new book for `owner_login`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A field fails validation
    /// - The owner does not exist
    /// - Database operation fails
    pub async fn save_book(&self, input: BookInput, owner_login: &str) -> Result<Book, BookError> {
        validate_fields(&input).map_err(BookError::Validation)?;

        let owner_id = self.owner_id(owner_login).await?;
        self.repo.create(owner_id, input).await
    }

    /// Books owned by `login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the database operation fails.
    pub async fn find_book_for_owner(&self, login: &str) -> Result<Vec<Book>, BookError> {
        let owner_id = self.owner_id(login).await?;
        self.repo.list_by_owner(owner_id).await
    }

    /// Books offered by users other than `viewer_login`; every book without a viewer.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewer does not exist or the database operation fails.
    pub async fn find_all(&self, viewer_login: Option<&str>) -> Result<Vec<Book>, BookError> {
        let excluded = match viewer_login {
            Some(login) => Some(self.owner_id(login).await?),
            None => None,
        };
        self.repo.list_excluding_owner(excluded).await
    }

    /// One page of the public catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_page(&self, query: BookQuery) -> Result<PageResponse<Book>, BookError> {
        let query = query.normalized();
        let (books, total) = self.repo.search(&query).await?;
        Ok(PageResponse::new(
            books,
            query.page.page,
            query.page.per_page,
            total,
        ))
    }

    /// A single book.
    ///
    /// # Errors
    ///
    /// Returns `BookError::NotFound` if there is no such book.
    pub async fn find_by_id(&self, book_id: i32) -> Result<Book, BookError> {
        self.repo
            .find_by_id(book_id)
            .await?
            .ok_or(BookError::NotFound(book_id))
    }

    /// Delete a book owned by `login`, including its attachment.
    ///
    /// Books of other users are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `BookError::NotFound` if the book is absent or not owned by `login`.
    pub async fn delete_book(&self, book_id: i32, login: &str) -> Result<(), BookError> {
        let Some(owner_id) = self.repo.find_user_id(login).await? else {
            return Err(BookError::NotFound(book_id));
        };

        match self.repo.find_by_id(book_id).await? {
            Some(book) if book.owner_id == owner_id => {}
            _ => return Err(BookError::NotFound(book_id)),
        }

        if self.repo.delete(book_id).await? {
            Ok(())
        } else {
            Err(BookError::NotFound(book_id))
        }
    }

    async fn owner_id(&self, login: &str) -> Result<i32, BookError> {
        self.repo
            .find_user_id(login)
            .await?
            .ok_or_else(|| BookError::OwnerNotFound(login.to_string()))
    }
}
