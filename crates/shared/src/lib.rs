//! Shared types, errors, and configuration for Bookcrossing.
//!
//! This crate provides common types used across all other crates:
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT issuance/validation and e-mail delivery

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, TokenKind, TokenPair};
pub use config::{AppConfig, AttachmentConfig, EmailConfig};
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
