//! Error types for loading and saving the settings document.

use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for this crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors produced while reading, parsing, or writing settings.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// I/O failure while reading the settings file.
    #[error("failed to read settings{}: {message}", at(.path))]
    Read {
        /// Path associated with the read, when file-backed.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    /// The settings file exists but could not be decoded.
    #[error("failed to parse settings{}: {message}", at(.path))]
    Parse {
        /// Path associated with the parse, when file-backed.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    /// The document could not be encoded for storage.
    #[error("failed to encode settings: {message}")]
    Encode {
        /// Human-readable error message.
        message: String,
    },
    /// I/O failure while writing the settings file.
    #[error("failed to write settings{}: {message}", at(.path))]
    Write {
        /// Path associated with the write, when file-backed.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
}

/// Render an optional path suffix for error messages.
fn at(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}
