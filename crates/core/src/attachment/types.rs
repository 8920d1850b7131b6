//! Attachment types and data structures.

use chrono::{DateTime, Utc};

/// A file submitted for a book.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    /// Book the file belongs to.
    pub book_id: i32,
    /// Original file name as sent by the client.
    pub file_name: Option<String>,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

/// Attachment row ready to be stored.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// Book ID, which doubles as the attachment ID.
    pub book_id: i32,
    /// File name.
    pub file_name: String,
    /// Content type.
    pub content_type: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

/// Attachment metadata without the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInfo {
    /// Attachment ID, equal to the book ID.
    pub id: i32,
    /// File name.
    pub file_name: String,
    /// Content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

/// A stored attachment with its bytes.
#[derive(Debug, Clone)]
pub struct AttachmentFile {
    /// Metadata.
    pub info: AttachmentInfo,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

/// Returns true for raster `image/*` content types.
///
/// Parameters are ignored and the comparison is case-insensitive.
/// SVG is refused since it can carry scripts.
#[must_use]
pub fn is_image_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("image", subtype)) => {
            !subtype.is_empty() && !subtype.starts_with("svg") && !subtype.contains('/')
        }
        _ => false,
    }
}
