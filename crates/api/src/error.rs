//! Mapping of application errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookcrossing_core::{attachment::AttachmentError, book::BookError, user::UserError};
use bookcrossing_shared::AppError;
use serde_json::{Map, Value, json};
use tracing::error;

/// Error returned by handlers.
///
/// Not-found errors are reported under the entity name (`{"book": ...}`),
/// validation failures as `{"errors": [...]}`, everything else as
/// `{"error": ...}`. Server errors are logged and hidden from the client.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<BookError> for ApiError {
    fn from(err: BookError) -> Self {
        Self(err.into())
    }
}

impl From<AttachmentError> for ApiError {
    fn from(err: AttachmentError) -> Self {
        Self(err.into())
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match self.0 {
            AppError::NotFound { entity, message } => {
                let mut body = Map::new();
                body.insert(entity.to_string(), Value::String(message));
                Value::Object(body)
            }
            AppError::Validation(errors) => json!({ "errors": errors }),
            err if err.is_server_error() => {
                error!(error = %err, code = err.error_code(), "Request failed");
                json!({ "error": "Внутренняя ошибка сервера" })
            }
            err => json!({ "error": err.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
