//! Shared configuration and error types for AgriLink.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types with stable error codes
//! - Configuration management (database, commission policy)

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
