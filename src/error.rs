//! Crate-level error types.
//!
//! Errors raised while marshalling objects to the engine live in
//! [`crate::aedt::error`]; this module adds the configuration file errors
//! and the top-level [`Error`] the binary reports.

use std::path::PathBuf;

use thiserror::Error;

use crate::aedt::AedtError;

/// Result type for top-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error the command-line tool can report.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An engine or file operation failed.
    #[error(transparent)]
    Aedt(#[from] AedtError),
}

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}
