//! Configuration and startup error types.
//!
//! Remote and submission errors live next to the code that raises them:
//! [`TransportError`](crate::remote::TransportError) and
//! [`MutationError`](crate::session::MutationError).
//!
//! # Security Note
//!
//! Error messages never include the access token. Parse errors report the
//! file path only, not the offending contents.

use std::path::PathBuf;

use thiserror::Error;

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

/// Failures that stop the server binary before or while it runs.
#[derive(Error, Debug)]
pub enum StartupError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The remote transport could not be constructed.
    #[error("failed to initialise remote transport")]
    Transport(#[from] crate::remote::TransportError),

    /// The async runtime or stdio failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
