//! Shared utilities, configuration, and error handling for Nexo
//!
//! This crate provides common functionality used across the Nexo backend:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Request extractors
//! - Database connection helpers

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::{Config, CorsOrigins, LogFormat, StoreProvider};
pub use error::{Error, Result};
pub use extractors::{OptionalValidatedJson, ValidatedJson};
