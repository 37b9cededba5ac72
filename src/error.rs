//! Error types for pagegate
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors that are part of the API,
//! and convert to appropriate HTTP responses at the boundary.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    #[error("Invalid protected path: {0}")]
    PathRule(#[from] PathRuleError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Protected-page storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No protected page with id {pid}")]
    NotFound { pid: u64 },

    #[error("Duplicate path entry: a page or its alias already uses '{path}'")]
    DuplicatePath { path: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors produced by a single gate evaluation
///
/// The gate never degrades a collaborator failure into "no protected pages".
/// The caller decides whether an error means fail-open or fail-closed,
/// driven by the `protection.on_store_error` setting.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Protected page store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Validation errors for protected path rules
#[derive(Error, Debug)]
pub enum PathRuleError {
    #[error("The path needs to start with a slash")]
    MissingLeadingSlash,

    #[error("The path must not be empty")]
    Empty,

    #[error("'{path}' is not a routable path")]
    NotRoutable { path: String },
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
