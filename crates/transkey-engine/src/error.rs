use std::{result::Result as StdResult, time::Duration};

use settings_store::Action;
use thiserror::Error;

use crate::host::HostOp;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the transkey engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading or saving the settings document failed.
    #[error("Settings error: {0}")]
    Persistence(#[from] settings_store::Error),

    /// A host facility rejected a call.
    #[error("Host {op} failed: {message}")]
    Host {
        /// The rejected call.
        op: HostOp,
        /// Host-supplied reason.
        message: String,
    },

    /// A host call did not complete in time.
    #[error("Host {op} timed out after {after:?}")]
    Timeout {
        /// The call that hung.
        op: HostOp,
        /// The bound that elapsed.
        after: Duration,
    },

    /// The host refused to select a backend.
    #[error("failed to choose backend '{name}': {reason}")]
    BackendSelection {
        /// Requested backend.
        name: String,
        /// Why it was refused.
        reason: String,
    },

    /// A supplied combo string does not parse.
    #[error("Invalid key combo: {0}")]
    InvalidCombo(#[from] keycombo::Error),

    /// The combo is already held by another enabled binding.
    #[error("{combo} is already used by {holder}")]
    ComboInUse {
        /// The contested combo.
        combo: String,
        /// The action currently holding it.
        holder: Action,
    },

    /// A failed change left the old combo unregistered, so the binding was
    /// disabled.
    #[error("{cause}; {combo} is not registered, so the hotkey is now disabled")]
    Unbound {
        /// The combo the binding held.
        combo: String,
        /// What went wrong first.
        cause: Box<Error>,
    },

    /// An action has no binding in the document. This is a defect, not a
    /// runtime condition.
    #[error("no hotkey binding declared for action {0}")]
    UndeclaredAction(Action),

    /// The notification receiver has been dropped.
    #[error("notification channel closed")]
    ChannelClosed,
}
