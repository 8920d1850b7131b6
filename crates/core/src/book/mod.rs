//! Book listings.
//!
//! Every book belongs to exactly one user. Only that owner may delete it,
//! and deleting it takes the cover image along.

mod error;
mod service;
mod types;

pub use error::BookError;
pub use service::{BookRepository, BookService};
pub use types::{Book, BookInput, BookQuery};
