//! Book cover images.
//!
//! A book carries at most one attachment, stored under the book's own ID.
//! Uploads are checked in a fixed order:
//! - File name present
//! - Image content type
//! - Size limit
//! - Book owned by the uploader

mod error;
mod service;
mod types;

pub use error::AttachmentError;
pub use service::{AttachmentRepository, AttachmentService};
pub use types::{AttachmentFile, AttachmentInfo, AttachmentUpload, NewAttachment, is_image_content_type};
