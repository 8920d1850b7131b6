//! Book types and data structures.

use bookcrossing_shared::types::PageRequest;
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::attachment::AttachmentInfo;
use crate::validation::not_blank;

/// Data a user submits when listing a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct BookInput {
    /// Title.
    #[validate(custom(
        function = "not_blank",
        message = "Название должно содержать хотя бы один видимый символ"
    ))]
    pub title: String,
    /// Author.
    #[validate(custom(
        function = "not_blank",
        message = "Поле \"автор\" должно содержать хотя бы один видимый символ"
    ))]
    pub author: String,
    /// Genre.
    pub genre: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Publishing house.
    pub publishing_house: Option<String>,
    /// Year of publishing.
    #[validate(range(
        min = 0,
        max = 2100,
        message = "Год издания должен быть в диапазоне от 0 до 2100"
    ))]
    pub year_of_publishing: Option<i32>,
}

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Generated identifier.
    pub id: i32,
    /// Owning user.
    pub owner_id: i32,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Genre.
    pub genre: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Publishing house.
    pub publishing_house: Option<String>,
    /// Year of publishing.
    pub year_of_publishing: Option<i32>,
    /// Cover image metadata, if one was uploaded.
    pub attachment: Option<AttachmentInfo>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Returns the user-supplied part of the book.
    #[must_use]
    pub fn content(&self) -> BookInput {
        BookInput {
            title: self.title.clone(),
            author: self.author.clone(),
            genre: self.genre.clone(),
            description: self.description.clone(),
            publishing_house: self.publishing_house.clone(),
            year_of_publishing: self.year_of_publishing,
        }
    }
}

/// Filters for the public catalogue.
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    /// Substring the title must contain.
    pub title: Option<String>,
    /// Substring the author must contain.
    pub author: Option<String>,
    /// Page to return.
    pub page: PageRequest,
}

impl BookQuery {
    /// Drops empty filters and clamps the page.
    #[must_use]
    pub fn normalized(self) -> Self {
        let non_empty = |s: Option<String>| {
            s.map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            title: non_empty(self.title),
            author: non_empty(self.author),
            page: self.page.normalized(),
        }
    }
}
