//! Attachment routes: upload, removal and download of book covers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{info, warn};

use super::books::{BookIdQuery, BookResponse};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ApiQuery},
    middleware::AuthUser,
};
use bookcrossing_core::attachment::{AttachmentService, AttachmentUpload};
use bookcrossing_db::AttachmentRepository;
use bookcrossing_shared::AppError;

/// Longest `bookId` value worth parsing.
const BOOK_ID_MAX_BYTES: usize = 32;

/// Routes that require an access token.
///
/// The upload body is not limited as a whole: each buffered field is capped
/// in `read_upload`, and the rest of an oversized file is never kept.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user/myBook/attachment",
            post(save_attachment).delete(delete_attachment),
        )
        .layer(DefaultBodyLimit::disable())
}

/// Public download route.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/books/{book_id}/attachment", get(download_attachment))
}

fn service(state: &AppState) -> AttachmentService<AttachmentRepository> {
    AttachmentService::new(
        Arc::new(AttachmentRepository::new((*state.db).clone())),
        state.attachment_max_bytes,
    )
}

fn multipart_error(err: &MultipartError) -> ApiError {
    AppError::BadRequest(err.body_text()).into()
}

/// Buffers a field, stopping once it is longer than `limit`.
async fn read_capped(field: &mut Field<'_>, limit: usize) -> Result<Vec<u8>, MultipartError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        data.extend_from_slice(&chunk);
        if data.len() > limit {
            break;
        }
    }
    Ok(data)
}

/// Reads the `bookId` and `file` fields of the upload form.
///
/// A file over `max_bytes` is kept truncated to just past the limit, so the
/// service still reports name and format problems before the size.
async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> ApiResult<AttachmentUpload> {
    let mut book_id = None;
    let mut file = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        match field.name() {
            Some("bookId") => {
                let raw = read_capped(&mut field, BOOK_ID_MAX_BYTES)
                    .await
                    .map_err(|e| multipart_error(&e))?;
                let id = std::str::from_utf8(&raw)
                    .ok()
                    .and_then(|text| text.trim().parse::<i32>().ok())
                    .ok_or_else(|| {
                        AppError::BadRequest(
                            "bookId: Некорректный идентификатор книги".to_string(),
                        )
                    })?;
                book_id = Some(id);
            }
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = read_capped(&mut field, max_bytes)
                    .await
                    .map_err(|e| multipart_error(&e))?;
                file = Some((file_name, content_type, data));
            }
            _ => {}
        }
    }

    let book_id = book_id
        .ok_or_else(|| AppError::BadRequest("bookId: Не указана книга".to_string()))?;
    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("file: Файл не передан".to_string()))?;

    Ok(AttachmentUpload {
        book_id,
        file_name,
        content_type,
        data,
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/user/myBook/attachment` - Upload or replace a book cover.
async fn save_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let upload = read_upload(multipart?, state.attachment_max_bytes).await?;
    let book_id = upload.book_id;

    let book = match service(&state).save_attachment(upload, auth.login()).await {
        Ok(book) => book,
        Err(e) => {
            warn!(book_id, login = %auth.login(), error = %e, "Attachment rejected");
            return Err(e.into());
        }
    };

    info!(book_id, login = %auth.login(), "Attachment saved");

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// DELETE `/user/myBook/attachment?bookId=` - Remove a book cover.
async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<BookIdQuery>,
) -> ApiResult<StatusCode> {
    service(&state)
        .delete_attachment(query.book_id, auth.login())
        .await?;

    info!(book_id = query.book_id, login = %auth.login(), "Attachment deleted");

    Ok(StatusCode::OK)
}

/// GET `/books/{book_id}/attachment` - Raw cover image.
async fn download_attachment(
    State(state): State<AppState>,
    ApiPath(book_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let file = service(&state).find_attachment(book_id).await?;

    Ok((
        [(header::CONTENT_TYPE, file.info.content_type)],
        file.data,
    ))
}
