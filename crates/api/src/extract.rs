//! Extractors whose rejections use the API error format.
//!
//! Axum's own extractors answer malformed input with plain-text bodies and
//! 415/422 statuses. These wrappers turn the same failures into `ApiError`.

use axum::extract::{
    FromRequest, FromRequestParts,
    multipart::MultipartRejection,
    rejection::{JsonRejection, PathRejection, QueryRejection},
};

use crate::error::ApiError;
use bookcrossing_shared::AppError;

/// JSON body extractor.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameter extractor.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

const JSON_DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";
const QUERY_PREFIX: &str = "Failed to deserialize query string: ";

/// Keeps the `field: message` part of a deserialization error.
fn field_error(text: &str, prefix: &str) -> String {
    text.strip_prefix(prefix).unwrap_or(text).to_string()
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let err = match rejection {
            JsonRejection::JsonDataError(_) => {
                AppError::Validation(vec![field_error(&text, JSON_DATA_PREFIX)])
            }
            _ => AppError::BadRequest(text),
        };
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        Self(AppError::Validation(vec![field_error(&text, QUERY_PREFIX)]))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::BadRequest(rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self(AppError::BadRequest(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_strips_prefix() {
        assert_eq!(
            field_error(
                "Failed to deserialize query string: bookId: invalid digit found in string",
                QUERY_PREFIX
            ),
            "bookId: invalid digit found in string"
        );
        assert_eq!(field_error("missing field `bookId`", QUERY_PREFIX), "missing field `bookId`");
    }
}
