//! Global error handling for project-context
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

/// Global error type for project-context operations
#[derive(Error, Debug)]
pub enum ContextError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The config file is not valid TOML
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The config file parses but its layout cannot be rewritten
    #[error("Config format error: {0}")]
    ConfigFormat(String),

    /// The project manifest (`package.json` / `Cargo.toml`) cannot be parsed
    #[error("Invalid project manifest: {0}")]
    Manifest(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ContextError {
    /// Whether this error came from reading or rewriting the config file
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigParse(_) | Self::ConfigFormat(_))
    }
}

/// Specialized Result type for project-context operations
pub type Result<T> = std::result::Result<T, ContextError>;

/// Creates a ContextError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::ContextError::$error_type(format!($($arg)*))
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
            ContextError::Unexpected(format!("{}: {}", context, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_positive(n: i32) -> Result<i32> {
        crate::ensure!(n > 0, InvalidArgument, "expected a positive number, got {}", n);
        Ok(n)
    }

    #[test]
    fn test_ensure_macro() {
        assert_eq!(check_positive(3).unwrap(), 3);
        let err = check_positive(-1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: expected a positive number, got -1"
        );
    }

    #[test]
    fn test_config_error_grouping() {
        assert!(ContextError::ConfigFormat("missing marker".into()).is_config_error());
        assert!(!ContextError::PathNotFound("/nope".into()).is_config_error());
        assert!(!ContextError::Manifest("Cargo.toml: bad".into()).is_config_error());
    }

    #[test]
    fn test_with_context() {
        let res: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::Other, "boom"));
        let err = res.with_context(|| "reading manifest").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected error: reading manifest: boom");
    }
}
