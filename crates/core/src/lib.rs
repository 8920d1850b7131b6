//! Core business logic for Bookcrossing.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and ownership checks live here; the
//! persistence side is reached through the repository traits each module defines.
//!
//! # Modules
//!
//! - `book` - Book listings scoped to their owner
//! - `attachment` - The single cover image of a book
//! - `user` - Registration, e-mail confirmation and authentication
//! - `auth` - Password hashing
//! - `validation` - Shared field rules and error formatting

pub mod attachment;
pub mod auth;
pub mod book;
pub mod user;
pub mod validation;
