//! Error types and result alias for combo parsing.
use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Reasons a combo string can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The combo string was empty or only whitespace.
    #[error("empty key combo")]
    Empty,
    /// A `+`-separated component was empty, e.g. `ALT++X`.
    #[error("empty token in key combo '{combo}'")]
    EmptyToken {
        /// The full combo as supplied.
        combo: String,
    },
    /// The combo contains only modifiers.
    #[error("key combo '{combo}' has no key")]
    MissingKey {
        /// The full combo as supplied.
        combo: String,
    },
    /// A non-final component is not a modifier.
    #[error("unknown modifier '{token}'")]
    UnknownModifier {
        /// The offending token.
        token: String,
    },
    /// The same modifier appears twice.
    #[error("modifier '{token}' repeated")]
    DuplicateModifier {
        /// The repeated modifier, in canonical form.
        token: String,
    },
    /// The final component is not a recognised key.
    #[error("unknown key '{token}'")]
    UnknownKey {
        /// The offending token.
        token: String,
    },
}
