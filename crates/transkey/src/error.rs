//! Error handling for the transkey binary.

use std::{io, result};

use settings_store::Action;
use thiserror::Error;

/// Convenient result type for transkey commands.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The settings file could not be read or written.
    #[error("Settings error: {0}")]
    Settings(#[from] settings_store::Error),
    /// A supplied combo does not parse.
    #[error("Invalid key combo: {0}")]
    Combo(#[from] keycombo::Error),
    /// The combo is already used by another enabled hotkey.
    #[error("{combo} is already used by {holder}")]
    ComboInUse {
        /// The contested combo.
        combo: String,
        /// The action holding it.
        holder: Action,
    },
    /// A command argument was rejected.
    #[error("{0}")]
    InvalidArgument(String),
}
