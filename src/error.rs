//! Global error handling for dirflat
//!
//! This module provides a centralized error type for the fatal and degradable
//! conditions raised across the pipeline. Per-file failures are logged and
//! skipped by the aggregator and never become a `DirFlatError`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for dirflat operations
#[derive(Error, Debug)]
pub enum DirFlatError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML processing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Scan root or manifest key is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Manifest document failed validation
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Ignore-pattern document failed validation
    #[error("Invalid ignore patterns: {0}")]
    InvalidPatterns(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for dirflat operations
pub type Result<T> = std::result::Result<T, DirFlatError>;

/// Creates a DirFlatError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::DirFlatError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            DirFlatError::Unexpected(format!("{}: {}", context, e))
        })
    }
}
