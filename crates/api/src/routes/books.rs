//! Book routes: the caller's shelf and the public catalogue.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};
use bookcrossing_core::attachment::AttachmentInfo;
use bookcrossing_core::book::{Book, BookInput, BookQuery, BookService};
use bookcrossing_db::BookRepository;
use bookcrossing_shared::types::{PageRequest, PageResponse};

/// Routes that require an access token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user/myBook",
            get(list_books).post(save_book).delete(delete_book),
        )
        .route("/user/myBook/own", get(list_own_books))
}

/// Public catalogue routes.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(catalogue))
        .route("/books/{book_id}", get(get_book))
}

fn service(state: &AppState) -> BookService<BookRepository> {
    BookService::new(Arc::new(BookRepository::new((*state.db).clone())))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for listing a book.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookRequest {
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
}

impl From<BookRequest> for BookInput {
    fn from(req: BookRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            genre: req.genre,
            description: req.description,
            publishing_house: req.publishing_house,
            year_of_publishing: req.year_of_publishing,
        }
    }
}

/// Book as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    /// Book ID.
    pub book_id: i32,
    /// Owner's user ID.
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
    /// Cover image metadata.
    pub attachment: Option<AttachmentResponse>,
    /// Creation time (RFC 3339).
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.id,
            owner_id: book.owner_id,
            title: book.title,
            author: book.author,
            genre: book.genre,
            description: book.description,
            publishing_house: book.publishing_house,
            year_of_publishing: book.year_of_publishing,
            attachment: book.attachment.map(AttachmentResponse::from),
            created_at: book.created_at,
        }
    }
}

/// Cover image metadata as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    /// Attachment ID, equal to the book ID.
    pub attachment_id: i32,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Upload time (RFC 3339).
    pub created_at: DateTime<Utc>,
}

impl From<AttachmentInfo> for AttachmentResponse {
    fn from(info: AttachmentInfo) -> Self {
        Self {
            attachment_id: info.id,
            file_name: info.file_name,
            content_type: info.content_type,
            size: info.size,
            created_at: info.created_at,
        }
    }
}

/// Query parameter naming a book.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookIdQuery {
    /// Book ID.
    pub book_id: i32,
}

/// Catalogue filters and paging.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueQuery {
    /// Title substring.
    pub title: Option<String>,
    /// Author substring.
    pub author: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl From<CatalogueQuery> for BookQuery {
    fn from(q: CatalogueQuery) -> Self {
        let defaults = PageRequest::default();
        Self {
            title: q.title,
            author: q.author,
            page: PageRequest {
                page: q.page.unwrap_or(defaults.page),
                per_page: q.per_page.unwrap_or(defaults.per_page),
            },
        }
    }
}

fn to_responses(books: Vec<Book>) -> Vec<BookResponse> {
    books.into_iter().map(BookResponse::from).collect()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/user/myBook` - List a new book owned by the caller.
async fn save_book(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<BookRequest>,
) -> ApiResult<impl IntoResponse> {
    let book = service(&state)
        .save_book(payload.into(), auth.login())
        .await?;

    info!(book_id = book.id, login = %auth.login(), "Book saved");

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET `/user/myBook` - Books offered by other users.
async fn list_books(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let books = service(&state).find_all(Some(auth.login())).await?;
    Ok(Json(to_responses(books)))
}

/// GET `/user/myBook/own` - The caller's own books.
async fn list_own_books(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let books = service(&state).find_book_for_owner(auth.login()).await?;
    Ok(Json(to_responses(books)))
}

/// DELETE `/user/myBook?bookId=` - Delete one of the caller's books.
async fn delete_book(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<BookIdQuery>,
) -> ApiResult<StatusCode> {
    service(&state)
        .delete_book(query.book_id, auth.login())
        .await?;

    info!(book_id = query.book_id, login = %auth.login(), "Book deleted");

    Ok(StatusCode::OK)
}

/// GET `/books` - Paginated public catalogue.
async fn catalogue(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CatalogueQuery>,
) -> ApiResult<Json<PageResponse<BookResponse>>> {
    let page = service(&state).find_page(query.into()).await?;
    Ok(Json(page.map(BookResponse::from)))
}

/// GET `/books/{book_id}` - A single book.
async fn get_book(
    State(state): State<AppState>,
    ApiPath(book_id): ApiPath<i32>,
) -> ApiResult<Json<BookResponse>> {
    let book = service(&state).find_by_id(book_id).await?;
    Ok(Json(book.into()))
}
